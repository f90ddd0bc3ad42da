use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::data_path::value_at;
use crate::utils::graphql::{escape_single_quoted, escape_string, quoted_list};

pub struct EntityManager {
    logger: Logger,
    validation: Validation,
    graph: Arc<dyn GraphQlTransport>,
}

impl EntityManager {
    pub fn new(logger: Logger, validation: Validation, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("entity"),
            validation,
            graph,
        }
    }

    pub async fn search_entities(&self, args: &Value) -> Result<Value, ToolError> {
        let mut search = self.validation.ensure_string(args.get("query"), "query")?;

        if let Some(account_id) = self
            .validation
            .ensure_optional_string(args.get("target_account_id"), "target_account_id")?
        {
            search.push_str(&format!(
                " AND accountId = '{}'",
                escape_single_quoted(&account_id)
            ));
        }
        let entity_types = match args.get("entity_types") {
            Some(raw) if !raw.is_null() => self
                .validation
                .ensure_string_array(Some(raw), "entity_types")?,
            _ => Vec::new(),
        };
        if !entity_types.is_empty() {
            search.push_str(&format!(" AND type IN ({})", quoted_list(&entity_types)));
        }

        let envelope = self
            .graph
            .execute(&entity_search_query(&search), None)
            .await?;
        Ok(value_at(
            &envelope.data_or_null(),
            "actor.entitySearch.results",
            json!({"entities": []}),
        ))
    }

    pub async fn get_entity_details(&self, args: &Value) -> Result<Value, ToolError> {
        let guid = self
            .validation
            .ensure_string(args.get("entity_guid"), "entity_guid")?;

        let envelope = self
            .graph
            .execute(&entity_details_query(&guid), None)
            .await?;
        let entity = value_at(&envelope.data_or_null(), "actor.entity", Value::Null);
        if entity.is_null() {
            return Err(ToolError::not_found("Entity not found"));
        }
        Ok(entity)
    }
}

fn entity_search_query(search: &str) -> String {
    format!(
        r#"{{
  actor {{
    entitySearch(query: "{search}") {{
      results {{
        entities {{
          guid
          name
          type
          domain
          tags {{
            key
            values
          }}
        }}
        nextCursor
      }}
    }}
  }}
}}"#,
        search = escape_string(search),
    )
}

fn entity_details_query(guid: &str) -> String {
    format!(
        r#"{{
  actor {{
    entity(guid: "{guid}") {{
      guid
      name
      type
      domain
      entityType
      reporting
      tags {{
        key
        values
      }}
      ... on AlertableEntity {{
        alertSeverity
        recentAlertViolations {{
          alertSeverity
          violationId
          openedAt
          closedAt
          violationUrl
        }}
      }}
      ... on ApmApplicationEntity {{
        language
        settings {{
          apdexTarget
        }}
      }}
      relationships {{
        type
        target {{
          entities {{
            guid
            name
          }}
        }}
      }}
      goldenMetrics {{
        metrics {{
          name
          value
          unit
        }}
      }}
    }}
  }}
}}"#,
        guid = escape_string(guid),
    )
}

#[async_trait]
impl ToolHandler for EntityManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        match tool {
            "search_entities" => self.search_entities(&args).await,
            "get_entity_details" => self.get_entity_details(&args).await,
            _ => Err(ToolError::internal(format!(
                "entity manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}
