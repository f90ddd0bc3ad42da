use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::data_path::value_at;
use crate::utils::graphql::{escape_string, first_error_description, string_list};

pub const INCIDENT_PRIORITIES: &[&str] = &["CRITICAL", "HIGH", "MEDIUM", "LOW"];

pub struct AlertsManager {
    logger: Logger,
    validation: Validation,
    graph: Arc<dyn GraphQlTransport>,
}

impl AlertsManager {
    pub fn new(logger: Logger, validation: Validation, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("alerts"),
            validation,
            graph,
        }
    }

    pub async fn list_policies(&self, args: &Value) -> Result<Value, ToolError> {
        let account_id = self
            .validation
            .ensure_account_id(args.get("target_account_id"))?;

        let envelope = self
            .graph
            .execute(&policies_query(&account_id), None)
            .await?;
        Ok(value_at(
            &envelope.data_or_null(),
            "actor.account.alerts.policiesSearch.policies",
            json!([]),
        ))
    }

    pub async fn list_open_incidents(&self, args: &Value) -> Result<Value, ToolError> {
        let account_id = self
            .validation
            .ensure_account_id(args.get("target_account_id"))?;
        let priority = self.validation.ensure_optional_enum(
            args.get("priority"),
            "priority",
            INCIDENT_PRIORITIES,
        )?;

        let mut filter = format!("accountId = '{}' AND state = 'OPEN'", account_id);
        if let Some(priority) = &priority {
            filter.push_str(&format!(" AND priority = '{}'", priority));
        }

        let envelope = self
            .graph
            .execute(&open_incidents_query(&filter), None)
            .await?;
        let entities = value_at(
            &envelope.data_or_null(),
            "actor.entitySearch.results.entities",
            json!([]),
        );

        // Issues arrive nested per entity; the result is the
        // concatenation of every entity's issue list.
        let mut incidents = Vec::new();
        if let Some(entities) = entities.as_array() {
            for entity in entities {
                if let Some(issues) = value_at(entity, "issues.issues", json!([])).as_array() {
                    incidents.extend(issues.iter().cloned());
                }
            }
        }
        Ok(Value::Array(incidents))
    }

    pub async fn acknowledge_incident(&self, args: &Value) -> Result<Value, ToolError> {
        let incident_id = self
            .validation
            .ensure_string(args.get("incident_id"), "incident_id")?;
        let comment = self
            .validation
            .ensure_optional_string(args.get("comment"), "comment")?;

        let mutation = acknowledge_mutation(&[incident_id], comment.as_deref());
        let envelope = self.graph.execute(&mutation, None).await?;
        let node = value_at(&envelope.data_or_null(), "aiIssuesAcknowledge", Value::Null);
        if let Some(description) = first_error_description(&node) {
            return Err(ToolError::graphql(description));
        }

        let issue = node
            .get("issues")
            .and_then(|issues| issues.as_array())
            .and_then(|issues| issues.first())
            .cloned()
            .unwrap_or(Value::Null);
        Ok(issue)
    }

    pub async fn acknowledge_incidents(&self, args: &Value) -> Result<Value, ToolError> {
        let incident_ids = self
            .validation
            .ensure_string_array(args.get("incident_ids"), "incident_ids")?;

        let mutation = acknowledge_mutation(&incident_ids, None);
        let envelope = self.graph.execute(&mutation, None).await?;
        let node = value_at(&envelope.data_or_null(), "aiIssuesAcknowledge", Value::Null);
        if let Some(description) = first_error_description(&node) {
            return Err(ToolError::graphql(description));
        }

        Ok(node.get("issues").cloned().unwrap_or(json!([])))
    }
}

fn policies_query(account_id: &str) -> String {
    format!(
        r#"{{
  actor {{
    account(id: {account_id}) {{
      alerts {{
        policiesSearch {{
          policies {{
            id
            name
            incidentPreference
            conditions {{
              id
              name
              enabled
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
        account_id = account_id,
    )
}

fn open_incidents_query(filter: &str) -> String {
    format!(
        r#"{{
  actor {{
    entitySearch(query: "{filter}") {{
      results {{
        entities {{
          ... on AiIssuesEntity {{
            issues {{
              issues {{
                issueId
                title
                priority
                state
                createdAt
                sources
              }}
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
        filter = escape_string(filter),
    )
}

fn acknowledge_mutation(issue_ids: &[String], comment: Option<&str>) -> String {
    let comment_arg = comment
        .map(|c| format!(", comment: \"{}\"", escape_string(c)))
        .unwrap_or_default();
    let comment_field = if comment.is_some() { "\n        comment" } else { "" };
    format!(
        r#"mutation {{
  aiIssuesAcknowledge(
    issueIds: {issue_ids}{comment_arg}
  ) {{
    issues {{
        issueId
        state
        acknowledgedAt
        acknowledgedBy{comment_field}
    }}
    errors {{
      type
      description
    }}
  }}
}}"#,
        issue_ids = string_list(issue_ids),
        comment_arg = comment_arg,
        comment_field = comment_field,
    )
}

#[async_trait]
impl ToolHandler for AlertsManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        match tool {
            "list_alert_policies" => self.list_policies(&args).await,
            "list_open_incidents" => self.list_open_incidents(&args).await,
            "acknowledge_incident" => self.acknowledge_incident(&args).await,
            "acknowledge_incidents" => self.acknowledge_incidents(&args).await,
            _ => Err(ToolError::internal(format!(
                "alerts manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
