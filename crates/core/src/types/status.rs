//! Status enums for payments and payment polling.

use serde::{Deserialize, Serialize};

/// Payment method selected at checkout.
///
/// The wire names match the backend's Portuguese column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Credit card; supports installments.
    #[serde(rename = "CARTAO_CREDITO")]
    CartaoCredito,
    /// Debit card; always a single installment.
    #[serde(rename = "CARTAO_DEBITO")]
    CartaoDebito,
    /// Hosted gateway checkout (external browser session).
    #[serde(rename = "GATEWAY")]
    Gateway,
}

impl PaymentMethod {
    /// Whether this method supports more than one installment.
    #[must_use]
    pub const fn supports_installments(self) -> bool {
        matches!(self, Self::CartaoCredito)
    }
}

/// Server-owned payment status, as written by the gateway webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl PaymentStatus {
    /// Terminal statuses stop the poller.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }
}

/// Client-local polling state for a hosted-checkout payment.
///
/// `Checking` is the initial state before the first status query resolves;
/// `Failed` is entered when a status query itself errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    #[default]
    Checking,
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Failed,
}

impl PollStatus {
    /// Whether polling should stop in this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Checking | Self::Pending)
    }
}

impl From<PaymentStatus> for PollStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Approved => Self::Approved,
            PaymentStatus::Rejected => Self::Rejected,
            PaymentStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CartaoCredito).unwrap(),
            "\"CARTAO_CREDITO\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CartaoDebito).unwrap(),
            "\"CARTAO_DEBITO\""
        );
    }

    #[test]
    fn terminal_statuses() {
        assert!(PaymentStatus::Approved.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());

        assert!(PollStatus::Failed.is_terminal());
        assert!(!PollStatus::Checking.is_terminal());
        assert!(!PollStatus::Pending.is_terminal());
    }

    #[test]
    fn poll_status_maps_from_payment_status() {
        assert_eq!(PollStatus::from(PaymentStatus::Pending), PollStatus::Pending);
        assert_eq!(PollStatus::from(PaymentStatus::Approved), PollStatus::Approved);
        assert_eq!(PollStatus::from(PaymentStatus::Rejected), PollStatus::Rejected);
        assert_eq!(PollStatus::from(PaymentStatus::Cancelled), PollStatus::Cancelled);
    }
}
