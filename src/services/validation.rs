use crate::errors::ToolError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ACCOUNT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("account id pattern must compile"));

/// Account ids are backend-assigned numeric identifiers; anything else
/// is rejected before a query is built.
pub fn is_numeric_account_id(value: &str) -> bool {
    ACCOUNT_ID_RE.is_match(value)
}

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(&self, value: Option<&Value>, label: &str) -> Result<String, ToolError> {
        let text = value.and_then(|v| v.as_str()).map(|s| s.trim()).ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        if text.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(text.to_string())
    }

    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<String>, ToolError> {
        match value {
            None => Ok(None),
            Some(val) if val.is_null() => Ok(None),
            Some(val) => self.ensure_string(Some(val), label).map(Some),
        }
    }

    /// Resolved account id for an operation that mandates the numeric
    /// form: present and matching `^\d+$`.
    pub fn ensure_account_id(&self, value: Option<&Value>) -> Result<String, ToolError> {
        let id = self
            .present_account_id(value)
            .ok_or_else(ToolError::missing_account_id)?;
        if !is_numeric_account_id(&id) {
            return Err(ToolError::invalid_account_id());
        }
        Ok(id)
    }

    /// Resolved account id for operations that accept any non-empty
    /// identifier.
    pub fn ensure_present_account_id(&self, value: Option<&Value>) -> Result<String, ToolError> {
        self.present_account_id(value)
            .ok_or_else(ToolError::missing_account_id)
    }

    fn present_account_id(&self, value: Option<&Value>) -> Option<String> {
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

    pub fn ensure_string_array(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Vec<String>, ToolError> {
        let arr = value.and_then(|v| v.as_array()).ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be an array of strings", label))
        })?;
        let mut out = Vec::with_capacity(arr.len());
        for item in arr {
            let text = item.as_str().ok_or_else(|| {
                ToolError::invalid_params(format!("{} must be an array of strings", label))
            })?;
            out.push(text.to_string());
        }
        Ok(out)
    }

    pub fn ensure_optional_enum(
        &self,
        value: Option<&Value>,
        label: &str,
        allowed: &[&str],
    ) -> Result<Option<String>, ToolError> {
        let Some(text) = self.ensure_optional_string(value, label)? else {
            return Ok(None);
        };
        if !allowed.contains(&text.as_str()) {
            return Err(ToolError::invalid_params(format!(
                "{}: expected one of {}",
                label,
                allowed.join(", ")
            )));
        }
        Ok(Some(text))
    }

    pub fn ensure_i64(&self, value: Option<&Value>, label: &str) -> Result<i64, ToolError> {
        value
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be a number", label)))
    }

    pub fn ensure_optional_i64(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<i64>, ToolError> {
        match value {
            None => Ok(None),
            Some(val) if val.is_null() => Ok(None),
            Some(val) => self.ensure_i64(Some(val), label).map(Some),
        }
    }

    pub fn optional_bool(&self, value: Option<&Value>) -> bool {
        value.and_then(|v| v.as_bool()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_account_ids_pass() {
        for id in ["1", "123456", "000042"] {
            assert!(is_numeric_account_id(id), "{} should be numeric", id);
        }
    }

    #[test]
    fn non_numeric_account_ids_fail() {
        for id in ["", "abc", "12a", "12 34", "-1", "1.5"] {
            assert!(!is_numeric_account_id(id), "{} should be rejected", id);
        }
    }

    #[test]
    fn ensure_account_id_distinguishes_missing_from_malformed() {
        let validation = Validation::new();
        let missing = validation.ensure_account_id(None).unwrap_err();
        assert_eq!(missing.message, "Account ID must be provided");
        let bad = validation
            .ensure_account_id(Some(&json!("not-a-number")))
            .unwrap_err();
        assert_eq!(bad.message, "Invalid account ID format");
        let ok = validation.ensure_account_id(Some(&json!("123456"))).unwrap();
        assert_eq!(ok, "123456");
    }

    #[test]
    fn enum_validation_rejects_unknown_values() {
        let validation = Validation::new();
        let err = validation
            .ensure_optional_enum(Some(&json!("URGENT")), "priority", &["CRITICAL", "HIGH"])
            .unwrap_err();
        assert!(err.message.contains("priority"));
        let ok = validation
            .ensure_optional_enum(Some(&json!("HIGH")), "priority", &["CRITICAL", "HIGH"])
            .unwrap();
        assert_eq!(ok.as_deref(), Some("HIGH"));
    }
}
