use serde_json::{Map, Value};

use crate::client::rest::RestTransport;
use crate::constants::pagination::MAX_PAGES;
use crate::errors::ToolError;

#[derive(Debug, Clone, Copy, Default)]
pub struct PageOptions {
    pub page: Option<i64>,
    pub auto_paginate: bool,
}

#[derive(Debug, Clone)]
pub struct Paginated {
    pub items: Value,
    pub page: Option<i64>,
}

/// Walks a REST listing. Without `auto_paginate` this is a single GET
/// returning the first page's data as-is. With it, the engine follows
/// `rel="next"` links, carrying the `page` query parameter extracted
/// from each next URL into the following request, and aggregates every
/// page's data.
pub async fn paginate(
    client: &dyn RestTransport,
    path: &str,
    base_query: &Map<String, Value>,
    opts: &PageOptions,
) -> Result<Paginated, ToolError> {
    let mut pages: Vec<Value> = Vec::new();
    let mut page = opts.page;

    for _ in 0..MAX_PAGES {
        let mut query = base_query.clone();
        if let Some(number) = page {
            query.insert("page".to_string(), Value::from(number));
        }
        let query_ref = if query.is_empty() { None } else { Some(&query) };
        let response = client.get(path, query_ref).await?;

        if !opts.auto_paginate {
            return Ok(Paginated {
                items: response.data,
                page,
            });
        }
        pages.push(response.data);

        let Some(next) = response.links.get("next") else {
            return Ok(Paginated {
                items: flatten_pages(pages),
                page,
            });
        };
        page = page_from_url(next);
    }

    Err(ToolError::internal(format!(
        "Pagination did not terminate after {} pages for {}",
        MAX_PAGES, path
    ))
    .with_hint("The backend kept returning a rel=\"next\" link; narrow the query.".to_string()))
}

/// `page` query parameter embedded in a `next` link, if any.
fn page_from_url(link: &str) -> Option<i64> {
    let parsed = url::Url::parse(link).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<i64>().ok())
}

/// Array-shaped pages concatenate into one flat array; anything else
/// stays a raw per-page accumulator.
fn flatten_pages(pages: Vec<Value>) -> Value {
    if pages.iter().all(|page| page.is_array()) {
        let mut flat = Vec::new();
        for page in pages {
            if let Value::Array(items) = page {
                flat.extend(items);
            }
        }
        return Value::Array(flat);
    }
    Value::Array(pages)
}

/// Client-side post-filter. Applies only to array-shaped aggregates and
/// is a no-op otherwise.
pub fn filter_items<F>(items: Value, predicate: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    match items {
        Value::Array(entries) => Value::Array(
            entries
                .into_iter()
                .filter(|entry| predicate(entry))
                .collect(),
        ),
        other => other,
    }
}
