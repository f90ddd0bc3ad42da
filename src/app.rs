use std::collections::HashMap;
use std::sync::Arc;

use crate::client::nerdgraph::{GraphQlTransport, NerdGraphClient};
use crate::client::rest::{ConfigRestFactory, RestClientFactory};
use crate::config::Config;
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::tool_catalog;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;

pub struct App {
    pub logger: Logger,
    pub graph: Arc<NerdGraphClient>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let mut missing = Vec::new();
        for tool in tool_catalog().iter() {
            if !handlers.contains_key(&tool.name) {
                missing.push(tool.name.clone());
            }
        }
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "This is a server wiring bug: every tool in tool_catalog.json must have a handler."
                    .to_string(),
            )
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    pub fn initialize(config: Config) -> Result<Self, ToolError> {
        let logger = Logger::new("relic");
        let validation = Validation::new();
        let config = Arc::new(config);

        let graph = Arc::new(NerdGraphClient::new(&config));
        let graph_transport: Arc<dyn GraphQlTransport> = graph.clone();
        let rest_factory: Arc<dyn RestClientFactory> =
            Arc::new(ConfigRestFactory::new(config.clone()));

        let nrql_manager = Arc::new(managers::nrql::NrqlManager::new(
            logger.clone(),
            validation.clone(),
            graph_transport.clone(),
        ));
        let account_manager = Arc::new(managers::account::AccountManager::new(
            logger.clone(),
            validation.clone(),
            graph_transport.clone(),
        ));
        let apm_manager = Arc::new(managers::apm::ApmManager::new(
            logger.clone(),
            validation.clone(),
            graph_transport.clone(),
        ));
        let entity_manager = Arc::new(managers::entity::EntityManager::new(
            logger.clone(),
            validation.clone(),
            graph_transport.clone(),
        ));
        let alerts_manager = Arc::new(managers::alerts::AlertsManager::new(
            logger.clone(),
            validation.clone(),
            graph_transport.clone(),
        ));
        let synthetics_manager = Arc::new(managers::synthetics::SyntheticsManager::new(
            logger.clone(),
            validation.clone(),
            graph_transport.clone(),
        ));
        let nerdgraph_manager = Arc::new(managers::nerdgraph::NerdGraphManager::new(
            logger.clone(),
            graph_transport.clone(),
        ));
        let apm_rest_manager = Arc::new(managers::rest::apm::ApmRestManager::new(
            logger.clone(),
            validation.clone(),
            rest_factory.clone(),
        ));
        let alerts_rest_manager = Arc::new(managers::rest::alerts::AlertsRestManager::new(
            logger.clone(),
            validation.clone(),
            rest_factory.clone(),
        ));
        let metrics_rest_manager = Arc::new(managers::rest::metrics::MetricsRestManager::new(
            logger.clone(),
            validation.clone(),
            rest_factory.clone(),
        ));
        let deployments_rest_manager =
            Arc::new(managers::rest::deployments::DeploymentsRestManager::new(
                logger.clone(),
                validation.clone(),
                rest_factory.clone(),
            ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("run_nrql_query".to_string(), nrql_manager);
        handlers.insert("get_account_details".to_string(), account_manager);
        handlers.insert("list_apm_applications".to_string(), apm_manager);
        handlers.insert("search_entities".to_string(), entity_manager.clone());
        handlers.insert("get_entity_details".to_string(), entity_manager);
        handlers.insert("list_alert_policies".to_string(), alerts_manager.clone());
        handlers.insert("list_open_incidents".to_string(), alerts_manager.clone());
        handlers.insert("acknowledge_incident".to_string(), alerts_manager.clone());
        handlers.insert("acknowledge_incidents".to_string(), alerts_manager);
        handlers.insert(
            "list_synthetics_monitors".to_string(),
            synthetics_manager.clone(),
        );
        handlers.insert("create_browser_monitor".to_string(), synthetics_manager);
        handlers.insert("run_nerdgraph_query".to_string(), nerdgraph_manager);
        handlers.insert(
            "list_apm_applications_rest".to_string(),
            apm_rest_manager,
        );
        handlers.insert(
            "list_alert_policies_rest".to_string(),
            alerts_rest_manager.clone(),
        );
        handlers.insert("list_open_incidents_rest".to_string(), alerts_rest_manager);
        handlers.insert(
            "list_metric_names_for_host".to_string(),
            metrics_rest_manager.clone(),
        );
        handlers.insert(
            "get_metric_data_for_host".to_string(),
            metrics_rest_manager.clone(),
        );
        handlers.insert("list_application_hosts".to_string(), metrics_rest_manager);
        handlers.insert(
            "create_deployment".to_string(),
            deployments_rest_manager.clone(),
        );
        handlers.insert(
            "list_deployments_rest".to_string(),
            deployments_rest_manager.clone(),
        );
        handlers.insert("delete_deployment".to_string(), deployments_rest_manager);

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), config, handlers));

        Ok(Self {
            logger,
            graph,
            tool_executor,
        })
    }
}
