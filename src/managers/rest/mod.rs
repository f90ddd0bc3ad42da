pub mod alerts;
pub mod apm;
pub mod deployments;
pub mod metrics;

use serde_json::Value;

use crate::client::pagination::PageOptions;
use crate::config::Region;
use crate::errors::ToolError;
use crate::services::validation::Validation;

pub(crate) fn region_override(args: &Value) -> Result<Option<Region>, ToolError> {
    match args.get("region") {
        None => Ok(None),
        Some(raw) if raw.is_null() => Ok(None),
        Some(raw) => {
            let text = raw
                .as_str()
                .ok_or_else(|| ToolError::invalid_params("region: expected one of US, EU"))?;
            Region::parse(text).map(Some)
        }
    }
}

pub(crate) fn page_options(args: &Value, validation: &Validation) -> Result<PageOptions, ToolError> {
    Ok(PageOptions {
        page: validation.ensure_optional_i64(args.get("page"), "page")?,
        auto_paginate: validation.optional_bool(args.get("auto_paginate")),
    })
}
