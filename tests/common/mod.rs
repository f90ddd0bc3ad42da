#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use relic::client::nerdgraph::{GraphQlEnvelope, GraphQlTransport};
use relic::client::rest::{RestClientFactory, RestResponse, RestTransport};
use relic::config::{Config, Region};
use relic::errors::ToolError;
use relic::services::logger::Logger;
use relic::services::tool_executor::{ToolExecutor, ToolHandler};

/// Serializes tests that mutate process environment variables.
pub static ENV_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

pub fn test_config(default_account_id: Option<&str>) -> Arc<Config> {
    Arc::new(Config::new(
        "test-api-key",
        Region::Us,
        default_account_id.map(|id| id.to_string()),
    ))
}

pub fn executor_with(
    default_account_id: Option<&str>,
    handlers: Vec<(&str, Arc<dyn ToolHandler>)>,
) -> ToolExecutor {
    let map: HashMap<String, Arc<dyn ToolHandler>> = handlers
        .into_iter()
        .map(|(name, handler)| (name.to_string(), handler))
        .collect();
    ToolExecutor::new(Logger::new("test"), test_config(default_account_id), map)
}

/// Handler that records every invocation and echoes its args back.
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_args(&self) -> Value {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, args)| args.clone())
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ToolHandler for RecordingHandler {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool.to_string(), args.clone()));
        Ok(serde_json::json!({"echo": args}))
    }
}

/// NerdGraph transport fed from a queue of canned envelopes. Records
/// every query so tests can assert on the generated documents.
#[derive(Default)]
pub struct ScriptedGraph {
    responses: Mutex<VecDeque<Result<GraphQlEnvelope, ToolError>>>,
    pub queries: Mutex<Vec<(String, Option<Value>)>>,
}

impl ScriptedGraph {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_data(&self, data: Value) {
        self.responses.lock().unwrap().push_back(Ok(GraphQlEnvelope {
            data: Some(data),
            errors: None,
        }));
    }

    pub fn push_envelope(&self, envelope: GraphQlEnvelope) {
        self.responses.lock().unwrap().push_back(Ok(envelope));
    }

    pub fn push_error(&self, error: ToolError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }
}

#[async_trait]
impl GraphQlTransport for ScriptedGraph {
    async fn execute(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<GraphQlEnvelope, ToolError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), variables.cloned()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GraphQlEnvelope::default()))
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRestCall {
    pub method: String,
    pub path: String,
    pub query: Option<Map<String, Value>>,
    pub body: Option<Value>,
}

/// REST transport fed from a queue of canned responses, with an
/// optional fallback used once the queue runs dry (for unbounded-next
/// pagination scenarios).
#[derive(Default)]
pub struct ScriptedRest {
    responses: Mutex<VecDeque<Result<RestResponse, ToolError>>>,
    fallback: Mutex<Option<RestResponse>>,
    pub calls: Mutex<Vec<RecordedRestCall>>,
}

impl ScriptedRest {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_response(&self, response: RestResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: ToolError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn set_fallback(&self, response: RestResponse) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_response(&self) -> Result<RestResponse, ToolError> {
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        if let Some(fallback) = self.fallback.lock().unwrap().clone() {
            return Ok(fallback);
        }
        Err(ToolError::internal("no scripted response left"))
    }

    fn record(&self, method: &str, path: &str, query: Option<&Map<String, Value>>, body: Option<&Value>) {
        self.calls.lock().unwrap().push(RecordedRestCall {
            method: method.to_string(),
            path: path.to_string(),
            query: query.cloned(),
            body: body.cloned(),
        });
    }
}

#[async_trait]
impl RestTransport for ScriptedRest {
    async fn get(
        &self,
        path: &str,
        query: Option<&Map<String, Value>>,
    ) -> Result<RestResponse, ToolError> {
        self.record("GET", path, query, None);
        self.next_response()
    }

    async fn post(&self, path: &str, body: &Value) -> Result<RestResponse, ToolError> {
        self.record("POST", path, None, Some(body));
        self.next_response()
    }

    async fn delete(&self, path: &str) -> Result<RestResponse, ToolError> {
        self.record("DELETE", path, None, None);
        self.next_response()
    }
}

pub struct ScriptedRestFactory {
    transport: Arc<ScriptedRest>,
}

impl ScriptedRestFactory {
    pub fn new(transport: Arc<ScriptedRest>) -> Arc<Self> {
        Arc::new(Self { transport })
    }
}

impl RestClientFactory for ScriptedRestFactory {
    fn client_for(&self, _region: Option<Region>) -> Result<Arc<dyn RestTransport>, ToolError> {
        Ok(self.transport.clone())
    }
}

/// Canned page response; `next` becomes the `rel="next"` link.
pub fn rest_page(data: Value, next: Option<&str>) -> RestResponse {
    let mut links = std::collections::HashMap::new();
    if let Some(next) = next {
        links.insert("next".to_string(), next.to_string());
    }
    RestResponse {
        status: 200,
        data,
        links,
        url: "https://api.newrelic.com/v2/test.json".to_string(),
    }
}
