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

pub struct DeploymentsRestManager {
    logger: Logger,
    validation: Validation,
    rest: Arc<dyn RestClientFactory>,
}

impl DeploymentsRestManager {
    pub fn new(logger: Logger, validation: Validation, rest: Arc<dyn RestClientFactory>) -> Self {
        Self {
            logger: logger.child("rest:deployments"),
            validation,
            rest,
        }
    }

    pub async fn create(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;
        let application_id = self
            .validation
            .ensure_i64(args.get("application_id"), "application_id")?;
        let revision = self
            .validation
            .ensure_string(args.get("revision"), "revision")?;

        let mut deployment = Map::new();
        deployment.insert("revision".to_string(), Value::String(revision));
        for key in ["changelog", "description", "user"] {
            if let Some(value) = self.validation.ensure_optional_string(args.get(key), key)? {
                deployment.insert(key.to_string(), Value::String(value));
            }
        }

        let path = format!("/applications/{}/deployments", application_id);
        let response = client
            .post(&path, &json!({ "deployment": deployment }))
            .await?;
        Ok(response.into_value())
    }

    pub async fn list(&self, args: &Value) -> Result<Value, ToolError> {
        let client = self.rest.client_for(region_override(args)?)?;
        let application_id = self
            .validation
            .ensure_i64(args.get("application_id"), "application_id")?;

        let path = format!("/applications/{}/deployments", application_id);
        let opts = page_options(args, &self.validation)?;
        let paged = paginate(client.as_ref(), &path, &Map::new(), &opts).await?;
        Ok(json!({"items": paged.items, "page": paged.page}))
    }

    pub async fn delete(&self, args: &Value) -> Result<Value, ToolError> {
        if args.get("confirm").and_then(|v| v.as_bool()) != Some(true) {
            return Err(ToolError::invalid_params(
                "delete_deployment: confirm must be true",
            ));
        }
        let client = self.rest.client_for(region_override(args)?)?;
        let application_id = self
            .validation
            .ensure_i64(args.get("application_id"), "application_id")?;
        let deployment_id = self.validation.ensure_i64(args.get("id"), "id")?;

        let path = format!(
            "/applications/{}/deployments/{}",
            application_id, deployment_id
        );
        let response = client.delete(&path).await?;
        Ok(response.into_value())
    }
}

#[async_trait]
impl ToolHandler for DeploymentsRestManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        match tool {
            "create_deployment" => self.create(&args).await,
            "list_deployments_rest" => self.list(&args).await,
            "delete_deployment" => self.delete(&args).await,
            _ => Err(ToolError::internal(format!(
                "rest deployments manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
