use serde_json::Value;

/// Walks a dot-separated key path into a decoded response body. A
/// missing or null segment yields the caller's default instead of an
/// error; every response unwrap in the crate routes through here so the
/// defaulting policy lives in exactly one place.
pub fn value_at(root: &Value, path: &str, default: Value) -> Value {
    let mut current = root;
    for key in path.split('.') {
        match current.get(key) {
            Some(next) => current = next,
            None => return default,
        }
    }
    if current.is_null() {
        default
    } else {
        current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_nested_objects() {
        let root = json!({"actor": {"account": {"name": "Test"}}});
        assert_eq!(value_at(&root, "actor.account.name", Value::Null), "Test");
    }

    #[test]
    fn missing_segment_yields_default() {
        let root = json!({"actor": {}});
        assert_eq!(
            value_at(&root, "actor.account.alerts.policiesSearch.policies", json!([])),
            json!([])
        );
    }

    #[test]
    fn null_leaf_yields_default() {
        let root = json!({"actor": {"entity": null}});
        assert_eq!(value_at(&root, "actor.entity", Value::Null), Value::Null);
        assert_eq!(value_at(&root, "actor.entity", json!([])), json!([]));
    }
}
