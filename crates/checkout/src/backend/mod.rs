//! Typed client for the managed backend.
//!
//! # Architecture
//!
//! - Backend is source of truth for orders and payments - the client only
//!   creates rows and reads status back, it never mutates them afterwards
//! - REST row endpoints (`rest/v1/...`) plus serverless function invocation
//!   (`functions/v1/...`), JSON bodies throughout
//! - Payment status is written server-side by the gateway webhook; the
//!   client reads it through [`CheckoutBackend::payment_status`]
//!
//! The [`CheckoutBackend`] trait is the seam the submission sequencer,
//! gateway bridge, and payment poller depend on; tests substitute recording
//! doubles for it.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use zentra_core::{PaymentStatus, PreferenceId};

use crate::config::CheckoutConfig;
use types::{NewOrder, NewPayment, OrderRecord, PaymentRecord, PreferenceRequest, PreferenceResponse};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connectivity, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A creation call returned no row.
    #[error("Empty response: {0}")]
    EmptyResponse(&'static str),
}

/// Remote operations the checkout flow depends on.
///
/// Object-safe so flows can hold an `Arc<dyn CheckoutBackend>` and tests
/// can inject call-recording doubles.
#[async_trait]
pub trait CheckoutBackend: Send + Sync {
    /// Create an order row and return it with its server-assigned id.
    async fn create_order(&self, order: &NewOrder) -> Result<OrderRecord, BackendError>;

    /// Create a payment row referencing an existing order.
    async fn create_payment(&self, payment: &NewPayment) -> Result<PaymentRecord, BackendError>;

    /// Mint a hosted-checkout preference via the serverless function.
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceResponse, BackendError>;

    /// Last known gateway status for a preference's payment, or `None` if
    /// no payment row exists yet (webhook has not landed).
    async fn payment_status(
        &self,
        preference_id: &PreferenceId,
    ) -> Result<Option<PaymentStatus>, BackendError>;
}

// =============================================================================
// BackendClient
// =============================================================================

/// Reqwest-backed [`CheckoutBackend`] implementation.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    preference_function: String,
}

/// Projection used by the status query (`select=status`).
#[derive(Debug, Deserialize)]
struct StatusRow {
    status: PaymentStatus,
}

impl BackendClient {
    /// Create a new backend client from configuration.
    #[must_use]
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.backend_url.clone(),
                anon_key: config.anon_key.clone(),
                preference_function: config.preference_function.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.inner.base_url.join(path).map_err(|e| BackendError::Api {
            status: 0,
            body: format!("invalid endpoint path {path}: {e}"),
        })
    }

    /// POST a JSON body and parse the JSON response.
    ///
    /// Reads the body as text first so failures can be logged with the raw
    /// payload, the same diagnostics shape used for every backend call.
    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path)?;
        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .header(
                "Authorization",
                format!("Bearer {}", self.inner.anon_key.expose_secret()),
            )
            // Row-creation endpoints return nothing without this
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        self.parse_response(path, response).await
    }

    /// GET a row-filter query and parse the JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, BackendError> {
        let url = self.endpoint(path_and_query)?;
        let response = self
            .inner
            .client
            .get(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .header(
                "Authorization",
                format!("Bearer {}", self.inner.anon_key.expose_secret()),
            )
            .send()
            .await?;

        self.parse_response(path_and_query, response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %response_text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(BackendError::Parse(e))
            }
        }
    }
}

#[async_trait]
impl CheckoutBackend for BackendClient {
    #[instrument(skip(self, order), fields(code = %order.code))]
    async fn create_order(&self, order: &NewOrder) -> Result<OrderRecord, BackendError> {
        // Row endpoints respond with an array of created rows
        let rows: Vec<OrderRecord> = self.post_json("rest/v1/pedidos", order).await?;
        debug!(count = rows.len(), "order row created");
        rows.into_iter()
            .next()
            .ok_or(BackendError::EmptyResponse("pedidos"))
    }

    #[instrument(skip(self, payment), fields(order_id = %payment.order_id))]
    async fn create_payment(&self, payment: &NewPayment) -> Result<PaymentRecord, BackendError> {
        let rows: Vec<PaymentRecord> = self.post_json("rest/v1/pagamentos", payment).await?;
        rows.into_iter()
            .next()
            .ok_or(BackendError::EmptyResponse("pagamentos"))
    }

    #[instrument(skip(self, request), fields(order_id = %request.pedido_id))]
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceResponse, BackendError> {
        let path = format!("functions/v1/{}", self.inner.preference_function);
        self.post_json(&path, request).await
    }

    #[instrument(skip(self))]
    async fn payment_status(
        &self,
        preference_id: &PreferenceId,
    ) -> Result<Option<PaymentStatus>, BackendError> {
        let path = format!(
            "rest/v1/pagamentos?preferencia_id=eq.{}&select=status&limit=1",
            preference_id.as_str()
        );
        let rows: Vec<StatusRow> = self.get_json(&path).await?;
        Ok(rows.into_iter().next().map(|row| row.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_against_base_url() {
        let config = CheckoutConfig::for_tests("http://localhost:54321/".parse().unwrap());
        let client = BackendClient::new(&config);

        let url = client.endpoint("rest/v1/pedidos").unwrap();
        assert_eq!(url.as_str(), "http://localhost:54321/rest/v1/pedidos");
    }

    #[test]
    fn status_row_deserializes() {
        let row: StatusRow = serde_json::from_str(r#"{"status":"approved"}"#).unwrap();
        assert_eq!(row.status, PaymentStatus::Approved);
    }
}
