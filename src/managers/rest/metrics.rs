use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{page_options, region_override};
use crate::client::pagination::paginate;
use crate::client::rest::RestClientFactory;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;

pub struct MetricsRestManager {
    logger: Logger,
    validation: Validation,
    rest: Arc<dyn RestClientFactory>,
}

impl MetricsRestManager {
    pub fn new(logger: Logger, validation: Validation, rest: Arc<dyn RestClientFactory>) -> Self {
        Self {
            logger: logger.child("rest:metrics"),
            validation,
            rest,
        }
    }

    pub async fn list_metric_names(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;
        let application_id = self
            .validation
            .ensure_i64(args.get("application_id"), "application_id")?;
        let host_id = self.validation.ensure_i64(args.get("host_id"), "host_id")?;

        let mut query = Map::new();
        if let Some(name) = self
            .validation
            .ensure_optional_string(args.get("name"), "name")?
        {
            query.insert("name".to_string(), Value::String(name));
        }

        let path = format!("/applications/{}/hosts/{}/metrics", application_id, host_id);
        let opts = page_options(args, &self.validation)?;
        let paged = paginate(client.as_ref(), &path, &query, &opts).await?;
        Ok(json!({"items": paged.items, "page": paged.page}))
    }

    pub async fn get_metric_data(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;
        let application_id = self
            .validation
            .ensure_i64(args.get("application_id"), "application_id")?;
        let host_id = self.validation.ensure_i64(args.get("host_id"), "host_id")?;
        let names = self
            .validation
            .ensure_string_array(args.get("names"), "names")?;

        let mut query = Map::new();
        query.insert(
            "names".to_string(),
            Value::Array(names.into_iter().map(Value::String).collect()),
        );
        if let Some(values) = args.get("values").filter(|v| !v.is_null()) {
            let values = self.validation.ensure_string_array(Some(values), "values")?;
            query.insert(
                "values".to_string(),
                Value::Array(values.into_iter().map(Value::String).collect()),
            );
        }
        for key in ["from", "to"] {
            if let Some(value) = self.validation.ensure_optional_string(args.get(key), key)? {
                query.insert(key.to_string(), Value::String(value));
            }
        }
        if let Some(period) = self
            .validation
            .ensure_optional_i64(args.get("period"), "period")?
        {
            query.insert("period".to_string(), Value::from(period));
        }
        if let Some(summarize) = args.get("summarize").and_then(|v| v.as_bool()) {
            query.insert("summarize".to_string(), Value::Bool(summarize));
        }

        let path = format!(
            "/applications/{}/hosts/{}/metrics/data",
            application_id, host_id
        );
        let opts = page_options(args, &self.validation)?;
        let paged = paginate(client.as_ref(), &path, &query, &opts).await?;
        Ok(json!({"items": paged.items, "page": paged.page}))
    }

    pub async fn list_application_hosts(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;
        let application_id = self
            .validation
            .ensure_i64(args.get("application_id"), "application_id")?;

        let mut query = Map::new();
        if let Some(hostname) = self
            .validation
            .ensure_optional_string(args.get("filter_hostname"), "filter_hostname")?
        {
            query.insert("filter[hostname]".to_string(), Value::String(hostname));
        }
        if let Some(ids) = self
            .validation
            .ensure_optional_string(args.get("filter_ids"), "filter_ids")?
        {
            query.insert("filter[ids]".to_string(), Value::String(ids));
        }
        if let Some(page) = self.validation.ensure_optional_i64(args.get("page"), "page")? {
            query.insert("page".to_string(), Value::from(page));
        }

        let path = format!("/applications/{}/hosts", application_id);
        let query_ref = if query.is_empty() { None } else { Some(&query) };
        let response = client.get(&path, query_ref).await?;
        Ok(response.into_value())
    }
}

#[async_trait]
impl ToolHandler for MetricsRestManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        match tool {
            "list_metric_names_for_host" => self.list_metric_names(&args).await,
            "get_metric_data_for_host" => self.get_metric_data(&args).await,
            "list_application_hosts" => self.list_application_hosts(&args).await,
            _ => Err(ToolError::internal(format!(
                "rest metrics manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
