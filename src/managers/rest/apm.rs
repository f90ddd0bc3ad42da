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

pub struct ApmRestManager {
    logger: Logger,
    validation: Validation,
    rest: Arc<dyn RestClientFactory>,
}

impl ApmRestManager {
    pub fn new(logger: Logger, validation: Validation, rest: Arc<dyn RestClientFactory>) -> Self {
        Self {
            logger: logger.child("rest:apm"),
            validation,
            rest,
        }
    }

    pub async fn list_applications(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;

        let mut query = Map::new();
        for (arg, param) in [
            ("filter_name", "filter[name]"),
            ("filter_host", "filter[host]"),
            ("filter_language", "filter[language]"),
        ] {
            if let Some(value) = self.validation.ensure_optional_string(args.get(arg), arg)? {
                query.insert(param.to_string(), Value::String(value));
            }
        }
        if let Some(ids) = args.get("filter_ids").and_then(|v| v.as_array()) {
            if !ids.is_empty() {
                let joined = ids
                    .iter()
                    .map(|id| match id.as_str() {
                        Some(text) => text.to_string(),
                        None => id.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                query.insert("filter[ids]".to_string(), Value::String(joined));
            }
        }

        let opts = page_options(args, &self.validation)?;
        let paged = paginate(client.as_ref(), "/applications", &query, &opts).await?;
        Ok(json!({"items": paged.items, "page": paged.page}))
    }
}

#[async_trait]
impl ToolHandler for ApmRestManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_apm_applications_rest" => {
                self.logger.debug(tool, None);
                self.list_applications(&args).await
            }
            _ => Err(ToolError::internal(format!(
                "rest apm manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
