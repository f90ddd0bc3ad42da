use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::data_path::value_at;
use crate::utils::graphql::escape_string;

pub struct NrqlManager {
    logger: Logger,
    validation: Validation,
    graph: Arc<dyn GraphQlTransport>,
}

impl NrqlManager {
    pub fn new(logger: Logger, validation: Validation, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("nrql"),
            validation,
            graph,
        }
    }

    pub async fn run_query(&self, args: &Value) -> Result<Value, ToolError> {
        let nrql = args
            .get("nrql")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if nrql.is_empty() {
            return Err(ToolError::invalid_params(
                "Invalid or empty NRQL query provided",
            ));
        }
        let account_id = self
            .validation
            .ensure_account_id(args.get("target_account_id"))?;

        let envelope = self
            .graph
            .execute(&nrql_query(&account_id, nrql), None)
            .await?;
        if let Some(message) = envelope.first_error_message() {
            return Err(ToolError::graphql(message));
        }

        Ok(value_at(
            &envelope.data_or_null(),
            "actor.account.nrql",
            json!({"results": [], "metadata": {}}),
        ))
    }
}

fn nrql_query(account_id: &str, nrql: &str) -> String {
    format!(
        r#"{{
  actor {{
    account(id: {account_id}) {{
      nrql(query: "{nrql}") {{
        results
        metadata {{
          eventTypes
          facets
          timeSeries
        }}
      }}
    }}
  }}
}}"#,
        account_id = account_id,
        nrql = escape_string(nrql),
    )
}

#[async_trait]
impl ToolHandler for NrqlManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "run_nrql_query" => {
                self.logger.debug(tool, None);
                self.run_query(&args).await
            }
            _ => Err(ToolError::internal(format!(
                "nrql manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_embeds_account_and_escapes_nrql() {
        let query = nrql_query("123456", r#"SELECT count(*) FROM Transaction WHERE app = "x""#);
        assert!(query.contains("account(id: 123456)"));
        assert!(query.contains(r#"WHERE app = \"x\""#));
        assert!(query.contains("eventTypes"));
    }
}
