//! Payments service HTTP client
//!
//! Submits outbound payment instructions to the external payments service
//! and looks up their state.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::Account;
use crate::ports::{PaymentClient, PaymentInstruction, PaymentReceipt};

pub const DEFAULT_PAYMENTS_URL: &str = "http://localhost:8080/v1/api/payments";
pub const DEFAULT_PAYMENTS_TIMEOUT_SECS: u64 = 30;

/// Where the payments service lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_PAYMENTS_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_PAYMENTS_TIMEOUT_SECS
}

impl Default for PaymentClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PaymentClientConfig {
    /// Parse and check the base URL
    pub fn parsed_base_url(&self) -> Result<Url> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid payments URL '{}': {}", self.base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::Config(format!(
                "payments URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if parsed.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "payments URL '{}' cannot be used as a base",
                self.base_url
            )));
        }
        Ok(parsed)
    }
}

/// Error body the payments service sends with 4xx/5xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
}

/// Blocking HTTP client for the payments service
#[derive(Debug)]
pub struct HttpPaymentClient {
    client: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HttpPaymentClient {
    pub fn new(config: &PaymentClientConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        if config.timeout_secs == 0 {
            return Err(Error::Config("payments timeout must be at least one second".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn payment_url(&self, payment_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("payments URL cannot be used as a base".into()))?
            .pop_if_empty()
            .push(payment_id);
        Ok(url)
    }

    /// Map reqwest errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::PaymentUnavailable(format!(
                "payments service timed out after {} seconds",
                self.timeout_secs
            ))
        } else if error.is_connect() {
            Error::PaymentUnavailable(format!(
                "unable to connect to payments service at {}",
                self.base_url
            ))
        } else {
            Error::PaymentUnavailable(format!("payments request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let detail = response
            .text()
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .map(|msg| format!(": {}", msg))
            .unwrap_or_default();

        match code {
            404 => Err(Error::not_found(format!("{} not found{}", what, detail))),
            400..=499 => Err(Error::validation(format!(
                "payments service refused {} (HTTP {}){}",
                what, code, detail
            ))),
            _ => Err(Error::PaymentUnavailable(format!(
                "payments service error: HTTP {}{}",
                code, detail
            ))),
        }
    }

    fn read_receipt(&self, response: Response) -> Result<PaymentReceipt> {
        response.json::<PaymentReceipt>().map_err(|e| {
            Error::PaymentUnavailable(format!("malformed payments service response: {}", e))
        })
    }
}

fn validate_instruction(instruction: &PaymentInstruction) -> Result<()> {
    if instruction.reference.trim().is_empty() {
        return Err(Error::validation("payment reference cannot be empty"));
    }
    if instruction.creditor_iban.trim().is_empty() {
        return Err(Error::validation("creditor IBAN cannot be empty"));
    }
    if !instruction.amount.is_positive() {
        return Err(Error::validation("payment amount must be positive"));
    }
    if Account::normalize_currency(&instruction.currency) != instruction.currency
        || instruction.currency.len() != 3
    {
        return Err(Error::validation("payment currency must be a three-letter ISO 4217 code"));
    }
    Ok(())
}

impl PaymentClient for HttpPaymentClient {
    fn submit_payment(&self, instruction: &PaymentInstruction) -> Result<PaymentReceipt> {
        validate_instruction(instruction)?;

        tracing::debug!(reference = %instruction.reference, "submitting payment");
        let response = self
            .client
            .post(self.base_url.clone())
            .json(instruction)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let response = self.check_response_status(response, "payment")?;
        self.read_receipt(response)
    }

    fn get_payment(&self, payment_id: &str) -> Result<PaymentReceipt> {
        if payment_id.trim().is_empty() {
            return Err(Error::validation("payment id cannot be empty"));
        }

        let response = self
            .client
            .get(self.payment_url(payment_id)?)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let response = self.check_response_status(response, &format!("payment {}", payment_id))?;
        self.read_receipt(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::payments_mock::{MockConfig, MockPaymentsServer};
    use crate::domain::Money;
    use crate::ports::PaymentStatus;
    use uuid::Uuid;

    fn instruction(reference: &str) -> PaymentInstruction {
        PaymentInstruction {
            reference: reference.to_string(),
            debtor_account_id: Uuid::new_v4(),
            creditor_iban: "ZA00BANK0000000001".to_string(),
            amount: Money::from_minor(12_50),
            currency: "ZAR".to_string(),
        }
    }

    fn client_for(server: &MockPaymentsServer, timeout_secs: u64) -> HttpPaymentClient {
        HttpPaymentClient::new(&PaymentClientConfig {
            base_url: server.base_url(),
            timeout_secs,
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = PaymentClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/v1/api/payments");
        assert_eq!(config.timeout_secs, 30);
        assert!(HttpPaymentClient::new(&config).is_ok());
    }

    #[test]
    fn test_rejects_bad_urls() {
        for url in ["not a url", "ftp://example.com/payments", "mailto:ops@example.com"] {
            let result = HttpPaymentClient::new(&PaymentClientConfig {
                base_url: url.to_string(),
                timeout_secs: 30,
            });
            assert!(matches!(result, Err(Error::Config(_))), "accepted {}", url);
        }
    }

    #[test]
    fn test_payment_url_appends_id() {
        let client = HttpPaymentClient::new(&PaymentClientConfig {
            base_url: "http://localhost:8080/v1/api/payments/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            client.payment_url("pay_1").unwrap().as_str(),
            "http://localhost:8080/v1/api/payments/pay_1"
        );
    }

    #[test]
    fn test_submit_and_fetch_payment() {
        let server = MockPaymentsServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server, 5);

        let receipt = client.submit_payment(&instruction("inv-42")).unwrap();
        assert_eq!(receipt.reference, "inv-42");
        assert_eq!(receipt.status, PaymentStatus::Accepted);

        let fetched = client.get_payment(&receipt.payment_id).unwrap();
        assert_eq!(fetched.payment_id, receipt.payment_id);
        assert_eq!(fetched.status, PaymentStatus::Settled);
    }

    #[test]
    fn test_invalid_instruction_never_leaves_process() {
        let client = HttpPaymentClient::new(&PaymentClientConfig::default()).unwrap();
        let mut bad = instruction("inv-1");
        bad.amount = Money::ZERO;
        assert!(matches!(client.submit_payment(&bad), Err(Error::Validation(_))));
    }

    #[test]
    fn test_unknown_payment_is_not_found() {
        let server = MockPaymentsServer::start(MockConfig::default()).unwrap();
        let client = client_for(&server, 5);
        assert!(matches!(client.get_payment("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_status_mapping() {
        let server = MockPaymentsServer::start(MockConfig {
            fail_with: Some(422),
            ..Default::default()
        })
        .unwrap();
        let err = client_for(&server, 5).submit_payment(&instruction("a")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("HTTP 422"));

        let server = MockPaymentsServer::start(MockConfig {
            fail_with: Some(503),
            ..Default::default()
        })
        .unwrap();
        let err = client_for(&server, 5).submit_payment(&instruction("b")).unwrap_err();
        assert!(matches!(err, Error::PaymentUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let server = MockPaymentsServer::start(MockConfig {
            delay_ms: 2_500,
            ..Default::default()
        })
        .unwrap();
        let err = client_for(&server, 1).submit_payment(&instruction("slow")).unwrap_err();
        assert!(matches!(err, Error::PaymentUnavailable(_)), "got {:?}", err);
    }

    #[test]
    fn test_connection_refused_is_unavailable() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = HttpPaymentClient::new(&PaymentClientConfig {
            base_url: format!("http://127.0.0.1:{}/v1/api/payments", port),
            timeout_secs: 2,
        })
        .unwrap();
        let err = client.submit_payment(&instruction("c")).unwrap_err();
        assert!(matches!(err, Error::PaymentUnavailable(_)));
    }
}
