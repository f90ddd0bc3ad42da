use crate::constants::network;
use crate::errors::ToolError;

/// Backend region. Selects both the REST v2 base URL and the NerdGraph
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        match raw.trim().to_uppercase().as_str() {
            "US" => Ok(Region::Us),
            "EU" => Ok(Region::Eu),
            _ => Err(ToolError::invalid_params("region: expected one of US, EU")),
        }
    }

    pub fn rest_base_url(&self) -> &'static str {
        match self {
            Region::Us => network::US_REST_BASE_URL,
            Region::Eu => network::EU_REST_BASE_URL,
        }
    }

    pub fn nerdgraph_url(&self) -> &'static str {
        match self {
            Region::Us => network::US_NERDGRAPH_URL,
            Region::Eu => network::EU_NERDGRAPH_URL,
        }
    }
}

/// Process-wide configuration, resolved once at the edge and passed in
/// explicitly. Dispatch never reads ambient process state.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub region: Region,
    pub default_account_id: Option<String>,
}

impl Config {
    pub fn new(
        api_key: impl Into<String>,
        region: Region,
        default_account_id: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            region,
            default_account_id: default_account_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        }
    }

    pub fn from_env() -> Result<Self, ToolError> {
        let api_key = std::env::var("NEW_RELIC_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ToolError::missing_credentials("NEW_RELIC_API_KEY is required"))?;
        let region = match std::env::var("NEW_RELIC_REGION") {
            Ok(raw) if !raw.trim().is_empty() => Region::parse(&raw)?,
            _ => Region::Us,
        };
        let default_account_id = std::env::var("NEW_RELIC_ACCOUNT_ID").ok();
        Ok(Self::new(api_key, region, default_account_id))
    }
}
