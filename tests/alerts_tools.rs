mod common;

use common::{executor_with, ScriptedGraph};
use relic::errors::ToolErrorKind;
use relic::managers::alerts::AlertsManager;
use relic::services::logger::Logger;
use relic::services::tool_executor::ToolHandler;
use relic::services::validation::Validation;
use serde_json::json;
use std::sync::Arc;

fn manager(graph: Arc<ScriptedGraph>) -> AlertsManager {
    AlertsManager::new(Logger::new("test"), Validation::new(), graph)
}

#[tokio::test]
async fn listing_policies_end_to_end_returns_each_policy() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({
        "actor": {"account": {"alerts": {"policiesSearch": {"policies": [
            {
                "id": "1001",
                "name": "Golden signals",
                "incidentPreference": "PER_POLICY",
                "conditions": [{"id": "1", "name": "High error rate", "enabled": true}]
            },
            {
                "id": "1002",
                "name": "Latency",
                "incidentPreference": "PER_CONDITION",
                "conditions": []
            }
        ]}}}}
    }));

    let handler: Arc<dyn ToolHandler> = Arc::new(manager(graph.clone()));
    let executor = executor_with(None, vec![("list_alert_policies", handler)]);

    let payload = executor
        .execute("list_alert_policies", json!({"target_account_id": "123456"}))
        .await
        .unwrap();

    let policies = payload["result"].as_array().unwrap();
    assert_eq!(policies.len(), 2);
    for policy in policies {
        assert!(policy.get("id").is_some());
        assert!(policy.get("name").is_some());
        assert!(policy.get("incidentPreference").is_some());
        assert!(policy.get("conditions").is_some());
    }
    assert!(graph.recorded_queries()[0].contains("account(id: 123456)"));
}

#[tokio::test]
async fn policies_default_to_empty_when_path_is_missing() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({"actor": {"account": {}}}));

    let result = manager(graph)
        .list_policies(&json!({"target_account_id": "123456"}))
        .await
        .unwrap();

    assert_eq!(result, json!([]));
}

#[tokio::test]
async fn open_incidents_concatenate_issues_across_entities() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({
        "actor": {"entitySearch": {"results": {"entities": [
            {"issues": {"issues": [{"issueId": "i-1"}, {"issueId": "i-2"}]}},
            {},
            {"issues": {"issues": [{"issueId": "i-3"}]}}
        ]}}}
    }));

    let result = manager(graph.clone())
        .list_open_incidents(&json!({"target_account_id": "123456", "priority": "CRITICAL"}))
        .await
        .unwrap();

    let incidents = result.as_array().unwrap();
    assert_eq!(incidents.len(), 3);
    assert_eq!(incidents[2]["issueId"], "i-3");

    let query = &graph.recorded_queries()[0];
    assert!(query.contains("accountId = '123456' AND state = 'OPEN' AND priority = 'CRITICAL'"));
}

#[tokio::test]
async fn open_incidents_reject_unknown_priority() {
    let graph = ScriptedGraph::new();
    let err = manager(graph.clone())
        .list_open_incidents(&json!({"target_account_id": "123456", "priority": "URGENT"}))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ToolErrorKind::InvalidParams);
    assert!(graph.recorded_queries().is_empty());
}

#[tokio::test]
async fn acknowledge_returns_the_mutated_issue() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({
        "aiIssuesAcknowledge": {
            "issues": [{"issueId": "i-1", "state": "ACKNOWLEDGED"}],
            "errors": []
        }
    }));

    let result = manager(graph.clone())
        .acknowledge_incident(&json!({"incident_id": "i-1", "comment": "on it"}))
        .await
        .unwrap();

    assert_eq!(result["issueId"], "i-1");
    assert_eq!(result["state"], "ACKNOWLEDGED");

    let mutation = &graph.recorded_queries()[0];
    assert!(mutation.contains(r#"issueIds: ["i-1"]"#));
    assert!(mutation.contains(r#"comment: "on it""#));
}

#[tokio::test]
async fn acknowledge_surfaces_mutation_errors_by_description() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({
        "aiIssuesAcknowledge": {
            "issues": [],
            "errors": [{"type": "NOT_AUTHORIZED", "description": "cannot acknowledge issue"}]
        }
    }));

    let err = manager(graph)
        .acknowledge_incident(&json!({"incident_id": "i-1"}))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ToolErrorKind::Graphql);
    assert_eq!(err.message, "cannot acknowledge issue");
}

#[tokio::test]
async fn acknowledge_without_result_yields_null() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({}));

    let result = manager(graph)
        .acknowledge_incident(&json!({"incident_id": "i-1"}))
        .await
        .unwrap();

    assert!(result.is_null());
}

#[tokio::test]
async fn bulk_acknowledge_returns_all_issues() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({
        "aiIssuesAcknowledge": {
            "issues": [{"issueId": "i-1"}, {"issueId": "i-2"}],
            "errors": []
        }
    }));

    let result = manager(graph.clone())
        .acknowledge_incidents(&json!({"incident_ids": ["i-1", "i-2"]}))
        .await
        .unwrap();

    assert_eq!(result.as_array().unwrap().len(), 2);
    assert!(graph.recorded_queries()[0].contains(r#"issueIds: ["i-1","i-2"]"#));
}

#[tokio::test]
async fn bulk_acknowledge_defaults_to_empty_issue_list() {
    let graph = ScriptedGraph::new();
    graph.push_data(json!({"aiIssuesAcknowledge": {}}));

    let result = manager(graph)
        .acknowledge_incidents(&json!({"incident_ids": ["i-1"]}))
        .await
        .unwrap();

    assert_eq!(result, json!([]));
}
