//! Unified error handling for the checkout flow.
//!
//! Every remote-call failure is caught at the boundary where it occurs and
//! converted to a user-visible message before it can reach the rendering
//! layer; [`CheckoutError::user_message`] is that conversion. Precondition
//! and validation errors keep their specific, actionable messages; remote
//! failures collapse to a generic retryable message.

use thiserror::Error;
use zentra_core::card::CardError;

use crate::backend::BackendError;
use crate::checkout::{PrepareError, SubmitError};
use crate::config::ConfigError;
use crate::gateway::GatewayError;

/// Application-level error type for the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A checkout precondition failed (empty cart, no identity, no address).
    #[error("precondition failed: {0}")]
    Prepare(#[from] PrepareError),

    /// Submission failed (validation or remote).
    #[error("submission failed: {0}")]
    Submit(#[from] SubmitError),

    /// Hosted-checkout handoff failed.
    #[error("gateway handoff failed: {0}")]
    Gateway(#[from] GatewayError),

    /// A backend call failed outside a submission sequence.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CheckoutError {
    /// Whether retrying the same action could succeed.
    ///
    /// Precondition and validation errors need a different user action
    /// first; remote failures are retryable as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Prepare(_) | Self::Config(_) => false,
            Self::Submit(e) => !matches!(
                e,
                SubmitError::Card(_) | SubmitError::UnsupportedMethod(_)
            ),
            Self::Gateway(_) | Self::Backend(_) => true,
        }
    }

    /// User-facing message for this error.
    ///
    /// Internal detail (HTTP bodies, serde messages) is never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Prepare(PrepareError::EmptyCart) => "Your cart is empty.".to_string(),
            Self::Prepare(PrepareError::Unauthenticated) => {
                "Please sign in to continue.".to_string()
            }
            Self::Prepare(PrepareError::AddressRequired) => {
                "Add a delivery address to continue.".to_string()
            }
            Self::Submit(SubmitError::Card(e)) => card_message(e),
            Self::Submit(SubmitError::UnsupportedMethod(_)) => {
                "This payment method is not available here.".to_string()
            }
            Self::Submit(SubmitError::PaymentFailed { order_code, .. })
            | Self::Gateway(
                GatewayError::PreferenceFailed { order_code, .. }
                | GatewayError::PaymentRecordFailed { order_code, .. },
            ) => {
                format!(
                    "Order {order_code} was placed, but the payment could not be confirmed. Please try the payment again."
                )
            }
            Self::Submit(SubmitError::OrderFailed(_))
            | Self::Gateway(GatewayError::OrderFailed(_) | GatewayError::Browser(_))
            | Self::Backend(_) => "Something went wrong. Please try again.".to_string(),
            Self::Config(_) => "The app is misconfigured. Please contact support.".to_string(),
        }
    }
}

fn card_message(e: &CardError) -> String {
    match e {
        CardError::EmptyHolderName => "Enter the card holder's name.".to_string(),
        CardError::InvalidDocument(_) => "Enter a valid CPF (11 digits).".to_string(),
        CardError::MalformedExpiry | CardError::InvalidExpiryMonth => {
            "Enter the expiry as MM/YY.".to_string()
        }
        CardError::Expired => "This card has expired. Use a different card.".to_string(),
        CardError::InvalidCardNumber(_) => "Check the card number.".to_string(),
        CardError::InvalidSecurityCode => "Check the security code.".to_string(),
    }
}

/// Result type alias for `CheckoutError`.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use zentra_core::{OrderCode, OrderId, PaymentMethod};

    #[test]
    fn precondition_messages_are_actionable() {
        let err = CheckoutError::from(PrepareError::AddressRequired);
        assert_eq!(err.user_message(), "Add a delivery address to continue.");
        assert!(!err.is_retryable());
    }

    #[test]
    fn remote_failures_hide_internal_detail() {
        let err = CheckoutError::from(SubmitError::OrderFailed(BackendError::Api {
            status: 500,
            body: "stack trace with secrets".to_string(),
        }));
        assert!(!err.user_message().contains("stack trace"));
        assert!(err.is_retryable());
    }

    #[test]
    fn partial_failure_names_the_order() {
        let code = OrderCode::generate();
        let err = CheckoutError::from(SubmitError::PaymentFailed {
            order_id: OrderId::generate(),
            order_code: code.clone(),
            source: BackendError::Api {
                status: 502,
                body: "gateway".to_string(),
            },
        });
        assert!(err.user_message().contains(code.as_str()));
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = CheckoutError::from(SubmitError::UnsupportedMethod(PaymentMethod::Gateway));
        assert!(!err.is_retryable());
    }
}
