use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::tools::{ACCOUNT_REQUIRED, NUMERIC_ACCOUNT};
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::validation::is_numeric_account_id;
use crate::utils::suggest::suggest;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}

/// Stateless dispatcher. Each call resolves its own account id and
/// routes to a handler; concurrent invocations share nothing mutable.
#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    config: Arc<Config>,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(
        logger: Logger,
        config: Arc<Config>,
        handlers: HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Self {
        Self {
            logger: logger.child("executor"),
            config,
            handlers: Arc::new(handlers),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Effective account id: per-call override, then the fallback call
    /// field, then the process-wide default. Read fresh on every call.
    fn resolve_account_id(&self, args: &Value) -> Option<String> {
        argument_account_id(args.get("target_account_id"))
            .or_else(|| argument_account_id(args.get("account_id")))
            .or_else(|| self.config.default_account_id.clone())
    }

    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let started_at = chrono::Utc::now().timestamp_millis();

        let Some(handler) = self.handlers.get(tool) else {
            let candidates = self.tool_names();
            let suggestions = suggest(tool, &candidates, 5);
            let mut err = ToolError::not_found(format!("Unknown tool: {}", tool));
            if !suggestions.is_empty() {
                err = err.with_hint(format!("Did you mean: {}?", suggestions.join(", ")));
            }
            return Err(err);
        };

        let mut args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        if !args.is_object() {
            return Err(ToolError::invalid_params("Tool arguments must be an object"));
        }

        let account_id = self.resolve_account_id(&args);
        if account_id.is_none() && ACCOUNT_REQUIRED.contains(&tool) {
            return Err(ToolError::missing_account_id());
        }
        if let Some(id) = &account_id {
            if NUMERIC_ACCOUNT.contains(&tool) && !is_numeric_account_id(id) {
                return Err(ToolError::invalid_account_id());
            }
            if let Value::Object(map) = &mut args {
                map.insert("target_account_id".to_string(), Value::String(id.clone()));
            }
        }

        let trace_id = meta_id(&args, "trace_id");
        let span_id = meta_id(&args, "span_id");
        let parent_span_id = args
            .get("parent_span_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        self.logger.debug(tool, None);
        let result = handler.handle(tool, args).await?;

        Ok(serde_json::json!({
            "ok": true,
            "result": result,
            "meta": {
                "tool": tool,
                "trace_id": trace_id,
                "span_id": span_id,
                "parent_span_id": parent_span_id,
                "duration_ms": chrono::Utc::now().timestamp_millis() - started_at,
            },
        }))
    }
}

fn argument_account_id(value: Option<&Value>) -> Option<String> {
    let raw = value?;
    if let Some(text) = raw.as_str() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        return Some(trimmed.to_string());
    }
    raw.as_i64().map(|n| n.to_string())
}

/// A wrapping span may pass its own ids through the args; otherwise a
/// fresh one is minted per invocation.
fn meta_id(args: &Value, key: &str) -> String {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
