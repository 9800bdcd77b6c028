//! JSM Delivery Client

use crate::error::DeliveryError;
use crate::mask::render_masked;
use crate::payload::AlertPayload;
use crate::policy::{AttemptOutcome, NextStep, RetryPolicy};
use metrics::counter;
use relay_config::Settings;
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{debug, error, info};

/// Zabbix integration path under the JSM base URL
pub const INTEGRATION_PATH: &str = "/jsm/ops/integration/v1/json/zabbix";

const TARGET: &str = "JSM";

/// Successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Attempt that succeeded (1-based)
    pub attempts: u32,
    /// Response status code
    pub status: u16,
    /// Response body
    pub body: String,
}

/// HTTP client posting alerts to the JSM integration endpoint
pub struct DeliveryClient {
    http: Client,
    endpoint: String,
    policy: RetryPolicy,
}

impl DeliveryClient {
    /// Build the HTTP session from the effective settings
    ///
    /// Certificate verification is disabled. When the proxy is enabled both
    /// HTTP and HTTPS traffic go through it; otherwise no proxy is used,
    /// including proxies from the environment.
    pub fn new(settings: &Settings) -> Result<Self, DeliveryError> {
        let mut builder = Client::builder().danger_accept_invalid_certs(true);

        if settings.proxy.enabled {
            let proxy = Proxy::all(settings.proxy.url())
                .map_err(|e| DeliveryError::Client(format!("invalid proxy: {}", e)))?;
            debug!(
                "Routing delivery through proxy {}://{}:{}",
                settings.proxy.protocol, settings.proxy.host, settings.proxy.port
            );
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", settings.api_url.trim_end_matches('/'), INTEGRATION_PATH),
            policy: RetryPolicy::with_budget(settings.timeout_secs),
        })
    }

    /// Replace the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deliver the payload, retrying per the policy
    pub async fn send(&self, payload: &AlertPayload) -> Result<Delivery, DeliveryError> {
        let prefix = payload.log_prefix();
        debug!("URL: {}", self.endpoint);
        debug!("Data to be posted: {}", render_masked(payload.entries()));

        let mut attempt = 1;
        loop {
            let timeout = self.policy.attempt_timeout(attempt);
            debug!(
                "{} Trying to send data to {} with timeout: {:?}",
                prefix, TARGET, timeout
            );
            counter!("zabbix2jsm_delivery_attempts_total").increment(1);

            let outcome = self.attempt(payload, timeout).await;
            let step = self.policy.next_step(attempt, &outcome);

            let (failure, fatal) = match outcome {
                AttemptOutcome::Delivered(delivery) => {
                    debug!("{} Response code: {}", prefix, delivery.status);
                    debug!("{} Response: {}", prefix, delivery.body);
                    info!("{} Data from Zabbix posted to {} successfully", prefix, TARGET);
                    return Ok(Delivery { attempts: attempt, ..delivery });
                }
                AttemptOutcome::Retryable(e) => (e, false),
                AttemptOutcome::Fatal(e) => (e, true),
            };

            counter!("zabbix2jsm_delivery_failures_total").increment(1);
            log_failure(&prefix, attempt, &failure);

            match step {
                NextStep::RetryAfter(pause) => {
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
                _ if fatal => {
                    error!("{} Giving up on delivery to {}: {}", prefix, TARGET, failure);
                    return Err(failure);
                }
                _ => {
                    error!("{} All attempts failed to send data to {}", prefix, TARGET);
                    return Err(DeliveryError::Exhausted {
                        attempts: attempt,
                        last: Box::new(failure),
                    });
                }
            }
        }
    }

    async fn attempt(&self, payload: &AlertPayload, timeout: Duration) -> AttemptOutcome {
        let response = match self
            .http
            .post(&self.endpoint)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_send_error(e, timeout),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_send_error(e, timeout),
        };

        match validate_response(status, &body) {
            Ok(()) => AttemptOutcome::Delivered(Delivery {
                attempts: 0,
                status,
                body,
            }),
            Err(e) => AttemptOutcome::Retryable(e),
        }
    }
}

/// Accept only a 2xx status with a JSON body
pub fn validate_response(status: u16, body: &str) -> Result<(), DeliveryError> {
    if !(200..300).contains(&status) {
        return Err(DeliveryError::Status {
            status,
            body: body.to_string(),
        });
    }
    serde_json::from_str::<serde_json::Value>(body).map_err(|_| DeliveryError::InvalidJson {
        status,
        body: body.to_string(),
    })?;
    Ok(())
}

fn classify_send_error(e: reqwest::Error, timeout: Duration) -> AttemptOutcome {
    if e.is_builder() {
        AttemptOutcome::Fatal(DeliveryError::Request(e.to_string()))
    } else if e.is_timeout() {
        AttemptOutcome::Retryable(DeliveryError::Timeout(timeout))
    } else if e.is_connect() {
        AttemptOutcome::Retryable(DeliveryError::Connection(e.to_string()))
    } else {
        AttemptOutcome::Retryable(DeliveryError::Request(e.to_string()))
    }
}

fn log_failure(prefix: &str, attempt: u32, failure: &DeliveryError) {
    match failure {
        DeliveryError::Timeout(_) => error!("{} Request timed out (attempt {})", prefix, attempt),
        DeliveryError::Connection(_) => {
            error!("{} Connection error occurred (attempt {})", prefix, attempt)
        }
        DeliveryError::Status { status, body } | DeliveryError::InvalidJson { status, body } => {
            error!("{} Failed to post data. Status code: {}", prefix, status);
            error!("{} Response: {}", prefix, body);
        }
        other => error!("{} {} (attempt {})", prefix, other, attempt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_message::AlertRecord;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(url: &str) -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            api_url: url.to_string(),
            ..Default::default()
        }
    }

    fn payload() -> AlertPayload {
        let fields: AlertRecord = vec![("triggerId", "42"), ("hostName", "web1")]
            .into_iter()
            .collect();
        AlertPayload::new(fields, "test-key")
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            pause: Duration::from_millis(10),
            ..RetryPolicy::with_budget(12)
        }
    }

    #[test]
    fn test_validate_response() {
        assert!(validate_response(200, "{}").is_ok());
        assert!(validate_response(202, r#"{"result":"Request will be processed"}"#).is_ok());
        assert!(matches!(
            validate_response(503, "{}"),
            Err(DeliveryError::Status { status: 503, .. })
        ));
        assert!(matches!(
            validate_response(200, "<html>ok</html>"),
            Err(DeliveryError::InvalidJson { status: 200, .. })
        ));
        assert!(matches!(
            validate_response(200, ""),
            Err(DeliveryError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_endpoint_from_settings() {
        let client = DeliveryClient::new(&settings_for("https://api.atlassian.com/")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.atlassian.com/jsm/ops/integration/v1/json/zabbix"
        );
        assert_eq!(client.policy().budget_secs, 60);
    }

    #[test]
    fn test_proxy_client_builds() {
        let mut settings = settings_for("https://api.atlassian.com");
        settings.proxy.enabled = true;
        settings.proxy.protocol = "http".to_string();
        settings.proxy.username = "user".to_string();
        settings.proxy.password = "secret".to_string();
        assert!(DeliveryClient::new(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_enabled_proxy_carries_delivery() {
        let proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INTEGRATION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&proxy)
            .await;

        let mut settings = settings_for("http://jsm.unreachable.invalid");
        settings.proxy.enabled = true;
        settings.proxy.protocol = "http".to_string();
        settings.proxy.host = proxy.address().ip().to_string();
        settings.proxy.port = proxy.address().port();

        let client = DeliveryClient::new(&settings)
            .unwrap()
            .with_policy(fast_policy());
        let delivery = client.send(&payload()).await.unwrap();

        assert_eq!(delivery.attempts, 1);
        assert_eq!(delivery.status, 200);
    }

    #[tokio::test]
    async fn test_disabled_proxy_ignores_environment() {
        let env_proxy = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0)
            .mount(&env_proxy)
            .await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INTEGRATION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        std::env::set_var("HTTP_PROXY", env_proxy.uri());
        std::env::set_var("http_proxy", env_proxy.uri());
        let client = DeliveryClient::new(&settings_for(&server.uri()));
        std::env::remove_var("HTTP_PROXY");
        std::env::remove_var("http_proxy");

        let delivery = client
            .unwrap()
            .with_policy(fast_policy())
            .send(&payload())
            .await
            .unwrap();
        assert_eq!(delivery.attempts, 1);
    }

    #[tokio::test]
    async fn test_delivered_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INTEGRATION_PATH))
            .and(body_json(serde_json::json!({
                "triggerId": "42",
                "hostName": "web1",
                "apiKey": "test-key"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = DeliveryClient::new(&settings_for(&server.uri()))
            .unwrap()
            .with_policy(fast_policy());
        let delivery = client.send(&payload()).await.unwrap();

        assert_eq!(delivery.attempts, 1);
        assert_eq!(delivery.status, 200);
    }

    #[tokio::test]
    async fn test_recovers_after_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INTEGRATION_PATH))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(INTEGRATION_PATH))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"took": 1})))
            .mount(&server)
            .await;

        let client = DeliveryClient::new(&settings_for(&server.uri()))
            .unwrap()
            .with_policy(fast_policy());
        let delivery = client.send(&payload()).await.unwrap();

        assert_eq!(delivery.attempts, 2);
        assert_eq!(delivery.status, 202);
    }

    #[tokio::test]
    async fn test_non_json_body_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(3)
            .mount(&server)
            .await;

        let client = DeliveryClient::new(&settings_for(&server.uri()))
            .unwrap()
            .with_policy(fast_policy());
        let err = client.send(&payload()).await.unwrap_err();

        match err {
            DeliveryError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, DeliveryError::InvalidJson { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            pause: Duration::from_millis(10),
            ..RetryPolicy::with_budget(1)
        };
        let client = DeliveryClient::new(&settings_for(&server.uri()))
            .unwrap()
            .with_policy(policy);
        let err = client.send(&payload()).await.unwrap_err();

        match err {
            DeliveryError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, DeliveryError::Timeout(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_retried() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = DeliveryClient::new(&settings_for(&format!("http://127.0.0.1:{}", port)))
            .unwrap()
            .with_policy(fast_policy());
        let err = client.send(&payload()).await.unwrap_err();

        match err {
            DeliveryError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.is_retryable());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
