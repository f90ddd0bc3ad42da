use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::data_path::value_at;

pub struct AccountManager {
    logger: Logger,
    validation: Validation,
    graph: Arc<dyn GraphQlTransport>,
}

impl AccountManager {
    pub fn new(logger: Logger, validation: Validation, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("account"),
            validation,
            graph,
        }
    }

    pub async fn get_account_details(&self, args: &Value) -> Result<Value, ToolError> {
        let account_id = self
            .validation
            .ensure_account_id(args.get("target_account_id"))?;

        let envelope = self
            .graph
            .execute(&account_details_query(&account_id), None)
            .await?;
        let account = value_at(&envelope.data_or_null(), "actor.account", Value::Null);
        if account.is_null() {
            return Err(ToolError::not_found(format!(
                "Account {} not found",
                account_id
            )));
        }

        Ok(json!({
            "accountId": account.get("id").cloned().unwrap_or(Value::Null),
            "name": account.get("name").cloned().unwrap_or(Value::Null),
        }))
    }
}

fn account_details_query(account_id: &str) -> String {
    format!(
        r#"{{
  actor {{
    account(id: {account_id}) {{
      id
      name
    }}
  }}
}}"#,
        account_id = account_id,
    )
}

#[async_trait]
impl ToolHandler for AccountManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "get_account_details" => {
                self.logger.debug(tool, None);
                self.get_account_details(&args).await
            }
            _ => Err(ToolError::internal(format!(
                "account manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
