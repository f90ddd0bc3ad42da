use serde_json::Value;

/// Escapes a value for inclusion inside a double-quoted GraphQL string
/// literal. Every caller-supplied string that ends up inside `"..."`
/// in a query document must pass through here first.
pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes a value for a single-quoted term inside an entity-search
/// filter expression (`accountId = '...'`).
pub fn escape_single_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders `'a','b','c'` for `type IN (...)` clauses.
pub fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("'{}'", escape_single_quoted(item)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders a JSON string array (`["a","b"]`) for list arguments in
/// mutation documents. JSON encoding doubles as the escaping.
pub fn string_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// First error description from a mutation result node's `errors`
/// array, falling back to `message` when `description` is absent.
pub fn first_error_description(node: &Value) -> Option<String> {
    let errors = node.get("errors")?.as_array()?;
    let first = errors.first()?;
    first
        .get("description")
        .and_then(|v| v.as_str())
        .or_else(|| first.get("message").and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}
