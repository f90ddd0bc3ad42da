pub mod nerdgraph;
pub mod pagination;
pub mod rest;

use crate::errors::ToolError;

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        return ToolError::timeout("HTTP request timed out");
    }
    ToolError::retryable(err.to_string())
}
