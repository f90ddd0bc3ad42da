use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;

/// Raw NerdGraph passthrough. The decoded envelope (`data` plus any
/// `errors`) is returned untouched so the caller can inspect
/// operation-level failures itself.
pub struct NerdGraphManager {
    logger: Logger,
    graph: Arc<dyn GraphQlTransport>,
}

impl NerdGraphManager {
    pub fn new(logger: Logger, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("nerdgraph"),
            graph,
        }
    }

    pub async fn run_query(&self, args: &Value) -> Result<Value, ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if query.is_empty() {
            return Err(ToolError::invalid_params(
                "Invalid or empty GraphQL query provided",
            ));
        }
        let variables = match args.get("variables") {
            None => None,
            Some(raw) if raw.is_null() => None,
            Some(raw) if raw.is_object() => Some(raw),
            Some(_) => {
                return Err(ToolError::invalid_params("variables must be an object"));
            }
        };

        let envelope = self.graph.execute(query, variables).await?;
        Ok(envelope.into_value())
    }
}

#[async_trait]
impl ToolHandler for NerdGraphManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "run_nerdgraph_query" => {
                self.logger.debug(tool, None);
                self.run_query(&args).await
            }
            _ => Err(ToolError::internal(format!(
                "nerdgraph manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
