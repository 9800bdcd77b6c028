//! Delivery Error Types

use std::time::Duration;
use thiserror::Error;

/// Delivery failures
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Attempt exceeded its timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Could not reach the endpoint
    #[error("Connection error occurred: {0}")]
    Connection(String),

    /// Endpoint answered with a non-2xx status
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Endpoint answered 2xx without a JSON body
    #[error("Invalid JSON response (status {status}): {body}")]
    InvalidJson { status: u16, body: String },

    /// Any other failure while sending
    #[error("Error occurred while sending data: {0}")]
    Request(String),

    /// HTTP session could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Every attempt failed
    #[error("All {attempts} attempts failed to send data to JSM")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<DeliveryError>,
    },
}

impl DeliveryError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Connection(_)
                | Self::Status { .. }
                | Self::InvalidJson { .. }
                | Self::Request(_)
        )
    }
}
