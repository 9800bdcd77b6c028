//! JSM Delivery
//!
//! Posts a translated alert to the JSM Zabbix integration endpoint with:
//! - Three attempts with linearly widening timeouts
//! - A fixed pause between attempts
//! - Response validation (2xx status and a JSON body)
//! - Credential masking in diagnostic output

mod client;
mod error;
pub mod mask;
mod payload;
mod policy;

pub use client::{validate_response, Delivery, DeliveryClient, INTEGRATION_PATH};
pub use error::DeliveryError;
pub use payload::AlertPayload;
pub use policy::{AttemptOutcome, NextStep, RetryPolicy};
