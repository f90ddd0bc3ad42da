use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::nerdgraph::GraphQlTransport;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use crate::utils::data_path::value_at;
use crate::utils::graphql::{escape_single_quoted, escape_string, first_error_description, string_list};

pub const MONITOR_TYPES: &[&str] = &["SIMPLE", "BROWSER", "SCRIPT_API", "SCRIPT_BROWSER"];

pub struct SyntheticsManager {
    logger: Logger,
    validation: Validation,
    graph: Arc<dyn GraphQlTransport>,
}

impl SyntheticsManager {
    pub fn new(logger: Logger, validation: Validation, graph: Arc<dyn GraphQlTransport>) -> Self {
        Self {
            logger: logger.child("synthetics"),
            validation,
            graph,
        }
    }

    pub async fn list_monitors(&self, args: &Value) -> Result<Value, ToolError> {
        let account_id = self
            .validation
            .ensure_present_account_id(args.get("target_account_id"))?;
        let monitor_type = self.validation.ensure_optional_enum(
            args.get("monitor_type"),
            "monitor_type",
            MONITOR_TYPES,
        )?;

        let mut search = format!(
            "domain = 'SYNTH' AND accountId = '{}'",
            escape_single_quoted(&account_id)
        );
        if let Some(monitor_type) = &monitor_type {
            search.push_str(&format!(" AND monitorType = '{}'", monitor_type));
        }

        let envelope = self
            .graph
            .execute(&monitors_query(&search), None)
            .await?;
        Ok(value_at(
            &envelope.data_or_null(),
            "actor.entitySearch.results.entities",
            json!([]),
        ))
    }

    pub async fn create_browser_monitor(&self, args: &Value) -> Result<Value, ToolError> {
        let account_id = self
            .validation
            .ensure_account_id(args.get("target_account_id"))?;
        let name = self.validation.ensure_string(args.get("name"), "name")?;
        let url = self.validation.ensure_string(args.get("url"), "url")?;
        let frequency = self.validation.ensure_i64(args.get("frequency"), "frequency")?;
        let locations = self
            .validation
            .ensure_string_array(args.get("locations"), "locations")?;

        let mutation = create_monitor_mutation(&account_id, &name, &url, frequency, &locations);
        let envelope = self.graph.execute(&mutation, None).await?;
        let node = value_at(
            &envelope.data_or_null(),
            "syntheticsCreateSimpleBrowserMonitor",
            Value::Null,
        );
        if let Some(description) = first_error_description(&node) {
            return Err(ToolError::graphql(format!(
                "Failed to create monitor: {}",
                description
            )));
        }

        Ok(node.get("monitor").cloned().unwrap_or(Value::Null))
    }
}

fn monitors_query(search: &str) -> String {
    format!(
        r#"{{
  actor {{
    entitySearch(query: "{search}") {{
      results {{
        entities {{
          ... on SyntheticMonitorEntityOutline {{
            guid
            name
            monitorType
            period
            monitoredUrl
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

fn create_monitor_mutation(
    account_id: &str,
    name: &str,
    url: &str,
    frequency: i64,
    locations: &[String],
) -> String {
    format!(
        r#"mutation {{
  syntheticsCreateSimpleBrowserMonitor(
    accountId: {account_id}
    monitor: {{
      name: "{name}"
      uri: "{url}"
      period: {period}
      status: ENABLED
      locations: {{
        public: {locations}
      }}
    }}
  ) {{
    monitor {{
      id
      name
      uri
      period
      status
    }}
    errors {{
      type
      description
    }}
  }}
}}"#,
        account_id = account_id,
        name = escape_string(name),
        url = escape_string(url),
        period = frequency_to_period(frequency),
        locations = string_list(locations),
    )
}

/// Whole-minute check frequency → NerdGraph period constant.
/// Unrecognized values fall back to the 5-minute period.
fn frequency_to_period(frequency: i64) -> &'static str {
    match frequency {
        1 => "EVERY_MINUTE",
        5 => "EVERY_5_MINUTES",
        10 => "EVERY_10_MINUTES",
        15 => "EVERY_15_MINUTES",
        30 => "EVERY_30_MINUTES",
        60 => "EVERY_HOUR",
        _ => "EVERY_5_MINUTES",
    }
}

#[async_trait]
impl ToolHandler for SyntheticsManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, None);
        match tool {
            "list_synthetics_monitors" => self.list_monitors(&args).await,
            "create_browser_monitor" => self.create_browser_monitor(&args).await,
            _ => Err(ToolError::internal(format!(
                "synthetics manager does not handle tool '{}'",
                tool
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_frequencies_map_to_their_period() {
        assert_eq!(frequency_to_period(1), "EVERY_MINUTE");
        assert_eq!(frequency_to_period(5), "EVERY_5_MINUTES");
        assert_eq!(frequency_to_period(10), "EVERY_10_MINUTES");
        assert_eq!(frequency_to_period(15), "EVERY_15_MINUTES");
        assert_eq!(frequency_to_period(30), "EVERY_30_MINUTES");
        assert_eq!(frequency_to_period(60), "EVERY_HOUR");
    }

    #[test]
    fn unrecognized_frequency_falls_back_to_five_minutes() {
        assert_eq!(frequency_to_period(999), "EVERY_5_MINUTES");
        assert_eq!(frequency_to_period(0), "EVERY_5_MINUTES");
        assert_eq!(frequency_to_period(-5), "EVERY_5_MINUTES");
    }

    #[test]
    fn mutation_embeds_account_period_and_locations() {
        let mutation = create_monitor_mutation(
            "123456",
            "Checkout",
            "https://shop.example.com",
            15,
            &["AWS_US_EAST_1".to_string(), "AWS_EU_WEST_1".to_string()],
        );
        assert!(mutation.contains("accountId: 123456"));
        assert!(mutation.contains("period: EVERY_15_MINUTES"));
        assert!(mutation.contains(r#"public: ["AWS_US_EAST_1","AWS_EU_WEST_1"]"#));
    }
}
