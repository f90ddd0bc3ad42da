use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::map_reqwest_error;
use crate::config::Config;
use crate::errors::ToolError;

const VALIDATE_CREDENTIALS_QUERY: &str = "{ actor { user { id email } } }";

/// Decoded NerdGraph response body. A non-empty `errors` array means
/// the operation failed even though the transport returned 200; it is
/// handed back, not thrown, and each caller decides what to surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphQlEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

impl GraphQlEnvelope {
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().map(|e| !e.is_empty()).unwrap_or(false)
    }

    pub fn first_error_message(&self) -> Option<String> {
        let first = self.errors.as_ref()?.first()?;
        first
            .get("message")
            .and_then(|v| v.as_str())
            .or_else(|| first.get("description").and_then(|v| v.as_str()))
            .map(|s| s.to_string())
    }

    pub fn data_or_null(&self) -> Value {
        self.data.clone().unwrap_or(Value::Null)
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn execute(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<GraphQlEnvelope, ToolError>;
}

pub struct NerdGraphClient {
    api_key: String,
    endpoint: String,
    http: reqwest::Client,
}

impl NerdGraphClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(&config.api_key, config.region.nerdgraph_url())
    }

    /// Explicit endpoint, for proxies and tests. A blank API key is
    /// accepted here and rejected at call time.
    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            endpoint: endpoint.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Cheap credentials probe used at startup. Transport and auth
    /// failures map to `false`; they are expected outcomes here, not
    /// errors.
    pub async fn validate_credentials(&self) -> bool {
        self.execute(VALIDATE_CREDENTIALS_QUERY, None).await.is_ok()
    }
}

#[async_trait]
impl GraphQlTransport for NerdGraphClient {
    async fn execute(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<GraphQlEnvelope, ToolError> {
        if self.api_key.is_empty() {
            return Err(ToolError::missing_credentials(
                "NEW_RELIC_API_KEY environment variable is not set",
            ));
        }
        if query.trim().is_empty() {
            return Err(ToolError::invalid_params(
                "Invalid or empty GraphQL query provided",
            ));
        }

        let mut body = serde_json::json!({ "query": query });
        if let Some(vars) = variables {
            body["variables"] = vars.clone();
        }

        let response = self
            .http
            .post(&self.endpoint)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ToolError::unauthorized("Unauthorized: Invalid API key"));
        }
        if !status.is_success() {
            return Err(ToolError::nerdgraph_api(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            ));
        }

        response.json::<GraphQlEnvelope>().await.map_err(|err| {
            ToolError::internal(format!("Failed to decode NerdGraph body: {}", err))
        })
    }
}
