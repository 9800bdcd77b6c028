//! Relay Error Types

use jsm_delivery::DeliveryError;
use relay_config::ConfigError;
use thiserror::Error;

/// Fatal pipeline failures; every variant ends the process with a non-zero status
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error")]
    Config(#[from] ConfigError),

    #[error("Delivery failed")]
    Delivery(#[from] DeliveryError),
}
