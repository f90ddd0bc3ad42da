use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{page_options, region_override};
use crate::client::pagination::{filter_items, paginate};
use crate::client::rest::RestClientFactory;
use crate::errors::ToolError;
use crate::managers::alerts::INCIDENT_PRIORITIES;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;

pub struct AlertsRestManager {
    logger: Logger,
    validation: Validation,
    rest: Arc<dyn RestClientFactory>,
}

impl AlertsRestManager {
    pub fn new(logger: Logger, validation: Validation, rest: Arc<dyn RestClientFactory>) -> Self {
        Self {
            logger: logger.child("rest:alerts"),
            validation,
            rest,
        }
    }

    pub async fn list_policies(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;

        let mut query = Map::new();
        if let Some(name) = self
            .validation
            .ensure_optional_string(args.get("filter_name"), "filter_name")?
        {
            query.insert("filter[name]".to_string(), Value::String(name));
        }
        if let Some(page) = self.validation.ensure_optional_i64(args.get("page"), "page")? {
            query.insert("page".to_string(), Value::from(page));
        }

        let query_ref = if query.is_empty() { None } else { Some(&query) };
        let response = client.get("/alerts_policies", query_ref).await?;
        Ok(response.into_value())
    }

    pub async fn list_incidents(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;
        let only_open = self.validation.optional_bool(args.get("only_open"));
        let priority = self.validation.ensure_optional_enum(
            args.get("priority"),
            "priority",
            INCIDENT_PRIORITIES,
        )?;

        let opts = page_options(args, &self.validation)?;
        let paged = paginate(client.as_ref(), "/alerts_incidents", &Map::new(), &opts).await?;

        let items = filter_items(paged.items, |incident| {
            let mut keep = true;
            if only_open {
                // Open means the incident has no close timestamp (or a
                // zero one).
                let closed = incident.get("closed_at");
                keep = keep
                    && closed
                        .map(|v| v.is_null() || v.as_i64() == Some(0))
                        .unwrap_or(true);
            }
            if let Some(priority) = &priority {
                keep = keep
                    && incident.get("priority").and_then(|v| v.as_str())
                        == Some(priority.as_str());
            }
            keep
        });
        Ok(json!({"items": items, "page": paged.page}))
    }
}

#[async_trait]
impl ToolHandler for AlertsRestManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        match tool {
            "list_alert_policies_rest" => self.list_policies(&args).await,
            "list_open_incidents_rest" => self.list_incidents(&args).await,
            _ => Err(ToolError::internal(format!(
                "rest alerts manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
