use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::map_reqwest_error;
use crate::config::{Config, Region};
use crate::errors::ToolError;

/// One decoded REST v2 response. `links` is derived from the `Link`
/// header once at construction and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RestResponse {
    pub status: u16,
    pub data: Value,
    pub links: HashMap<String, String>,
    pub url: String,
}

impl RestResponse {
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[async_trait]
pub trait RestTransport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: Option<&Map<String, Value>>,
    ) -> Result<RestResponse, ToolError>;
    async fn post(&self, path: &str, body: &Value) -> Result<RestResponse, ToolError>;
    async fn delete(&self, path: &str) -> Result<RestResponse, ToolError>;
}

/// Builds one transport per invocation so a per-call region override
/// never leaks into another in-flight call.
pub trait RestClientFactory: Send + Sync {
    fn client_for(&self, region: Option<Region>) -> Result<Arc<dyn RestTransport>, ToolError>;
}

pub struct ConfigRestFactory {
    config: Arc<Config>,
}

impl ConfigRestFactory {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl RestClientFactory for ConfigRestFactory {
    fn client_for(&self, region: Option<Region>) -> Result<Arc<dyn RestTransport>, ToolError> {
        let region = region.unwrap_or(self.config.region);
        Ok(Arc::new(RestClient::new(&self.config.api_key, region)?))
    }
}

#[derive(Debug)]
pub struct RestClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(api_key: &str, region: Region) -> Result<Self, ToolError> {
        Self::with_base_url(api_key, region.rest_base_url())
    }

    /// Explicit base URL, for proxies and tests.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, ToolError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ToolError::missing_credentials("API key is required"));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn build_url(&self, path: &str, query: Option<&Map<String, Value>>) -> String {
        join_url(&self.base_url, path, query)
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        url: String,
    ) -> Result<RestResponse, ToolError> {
        let response = request
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let links = parse_link_header(&link_header);
        // The body is decoded before the OK check; failure bodies must
        // still be valid JSON or the decode error wins.
        let data: Value = response
            .json()
            .await
            .map_err(|err| ToolError::internal(format!("Failed to decode REST body: {}", err)))?;
        if !status.is_success() {
            return Err(ToolError::rest_api(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            ));
        }
        Ok(RestResponse {
            status: status.as_u16(),
            data,
            links,
            url,
        })
    }
}

#[async_trait]
impl RestTransport for RestClient {
    async fn get(
        &self,
        path: &str,
        query: Option<&Map<String, Value>>,
    ) -> Result<RestResponse, ToolError> {
        let url = self.build_url(path, query);
        self.dispatch(self.http.get(&url), url.clone()).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<RestResponse, ToolError> {
        let url = self.build_url(path, None);
        self.dispatch(self.http.post(&url).json(body), url.clone())
            .await
    }

    async fn delete(&self, path: &str) -> Result<RestResponse, ToolError> {
        let url = self.build_url(path, None);
        self.dispatch(self.http.delete(&url), url.clone()).await
    }
}

fn join_url(base_url: &str, path: &str, query: Option<&Map<String, Value>>) -> String {
    let normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let suffix = if normalized.ends_with(".json") {
        ""
    } else {
        ".json"
    };
    let qs = query.map(serialize_query).unwrap_or_default();
    format!("{}{}{}{}", base_url, normalized, suffix, qs)
}

/// Flat query map → query string. Arrays become repeated `key[]=value`
/// parameters in element order, nulls are omitted, scalars are
/// stringified.
fn serialize_query(params: &Map<String, Value>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if value.is_null() {
            continue;
        }
        if let Some(items) = value.as_array() {
            for item in items {
                serializer.append_pair(&format!("{}[]", key), &scalar_string(item));
                any = true;
            }
        } else {
            serializer.append_pair(key, &scalar_string(value));
            any = true;
        }
    }
    if !any {
        return String::new();
    }
    format!("?{}", serializer.finish())
}

fn scalar_string(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

/// `Link` header → relation map, following the
/// `<url>; rel="name", ...` grammar. Segments without a usable
/// `rel="..."` token are skipped rather than failing the parse.
fn parse_link_header(header: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();
    for part in header.split(',') {
        let mut sections = part.split(';');
        let Some(url_section) = sections.next() else {
            continue;
        };
        let url = url_section
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>');
        if url.is_empty() {
            continue;
        }
        let rel = sections.find_map(|section| {
            let section = section.trim();
            section
                .strip_prefix("rel=")
                .map(|raw| raw.trim_matches('"').to_string())
        });
        if let Some(rel) = rel {
            links.insert(rel, url.to_string());
        }
    }
    links
}
