use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::data_path::value_at;
use crate::utils::graphql::escape_string;

pub struct ApmManager {
    logger: Logger,
    validation: Validation,
    graph: Arc<dyn GraphQlTransport>,
}

impl ApmManager {
    pub fn new(logger: Logger, validation: Validation, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("apm"),
            validation,
            graph,
        }
    }

    pub async fn list_applications(&self, args: &Value) -> Result<Value, ToolError> {
        let account_id = self
            .validation
            .ensure_account_id(args.get("target_account_id"))?;

        let search = format!(
            "domain = 'APM' AND type = 'APPLICATION' AND accountId = '{}'",
            account_id
        );
        let envelope = self
            .graph
            .execute(&apm_search_query(&search), None)
            .await?;
        let entities = value_at(
            &envelope.data_or_null(),
            "actor.entitySearch.results.entities",
            json!([]),
        );

        let applications = entities
            .as_array()
            .map(|arr| arr.iter().map(with_folded_tags).collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(Value::Array(applications))
    }
}

fn apm_search_query(search: &str) -> String {
    format!(
        r#"{{
  actor {{
    entitySearch(query: "{search}") {{
      results {{
        entities {{
          ... on ApmApplicationEntityOutline {{
            guid
            name
            language
            reporting
            alertSeverity
            tags {{
              key
              values
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
        search = escape_string(search),
    )
}

/// Replaces the NerdGraph `tags: [{key, values}]` list with a flat map
/// of each key to its first value. Entries without a usable key or with
/// no values are dropped.
fn with_folded_tags(entity: &Value) -> Value {
    let Some(fields) = entity.as_object() else {
        return entity.clone();
    };
    let mut out: Map<String, Value> = fields.clone();
    let mut folded = Map::new();
    if let Some(tags) = fields.get("tags").and_then(|v| v.as_array()) {
        for tag in tags {
            let Some(key) = tag.get("key").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some(first) = tag.get("values").and_then(|v| v.as_array()).and_then(|values| values.first())
            else {
                continue;
            };
            folded.insert(key.to_string(), first.clone());
        }
    }
    out.insert("tags".to_string(), Value::Object(folded));
    Value::Object(out)
}

#[async_trait]
impl ToolHandler for ApmManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "list_apm_applications" => {
                self.logger.debug(tool, None);
                self.list_applications(&args).await
            }
            _ => Err(ToolError::internal(format!(
                "apm manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_fold_to_first_value_per_key() {
        let entity = json!({
            "guid": "entity-1",
            "name": "Entity 1",
            "tags": [
                {"key": "env", "values": ["production", "staging"]},
                {"key": "team", "values": ["backend"]},
                {"key": "empty", "values": []},
                {"key": null, "values": ["ignored"]}
            ]
        });
        let folded = with_folded_tags(&entity);
        assert_eq!(folded["tags"], json!({"env": "production", "team": "backend"}));
        assert_eq!(folded["name"], "Entity 1");
    }

    #[test]
    fn entity_without_tags_gets_an_empty_map() {
        let folded = with_folded_tags(&json!({"guid": "g"}));
        assert_eq!(folded["tags"], json!({}));
    }
}
