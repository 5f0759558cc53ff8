pub mod geocodio;
pub mod labels;
pub mod records;

use thiserror::Error;

/// Non-success HTTP response from any of the outbound APIs.
#[derive(Debug, Error)]
#[error("API error ({status_code}): {detail}")]
pub struct ApiError {
    pub status_code: u16,
    pub detail: String,
}
