//! Order/payment submission sequencing for the card path.
//!
//! The ordering invariant lives here: a payment row is only ever created
//! after order creation has returned a server-assigned id, so a payment can
//! never exist as an orphan. The reverse gap - an order whose payment
//! creation then failed - is not compensated; it is surfaced as
//! [`SubmitError::PaymentFailed`] carrying the created order's identifiers.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::{info, instrument, warn};
use zentra_core::card::{
    CardError, CardNumber, Document, Expiry, validate_holder_name, validate_security_code,
};
use zentra_core::{Money, OrderCode, OrderId, PaymentMethod};

use crate::backend::types::{CardPayload, NewOrder, NewOrderItem, NewPayment};
use crate::backend::{BackendError, CheckoutBackend};
use crate::cart::CartStore;

use super::CheckoutContext;

/// Raw card fields as captured by the payment form.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    /// `MM/YY`.
    pub expiry: String,
    pub security_code: String,
    /// Holder document (CPF), punctuation allowed.
    pub document: String,
}

/// The payment selection for a card submission.
#[derive(Debug, Clone)]
pub struct CardSelection {
    /// `CartaoCredito` or `CartaoDebito`.
    pub method: PaymentMethod,
    pub details: CardDetails,
    /// Requested installment count; only meaningful for credit and forced
    /// to 1 for debit.
    pub installments: u32,
}

/// What the success screen shows after a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub order_id: OrderId,
    pub order_code: OrderCode,
    pub total: Money,
    pub method: PaymentMethod,
    pub installments: u32,
}

/// Failures of the submission sequence.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The hosted-gateway method cannot be submitted through the card path.
    #[error("method {0:?} is not a card method")]
    UnsupportedMethod(PaymentMethod),

    /// A card field failed client-side validation; nothing reached the
    /// network.
    #[error("card validation failed: {0}")]
    Card(#[from] CardError),

    /// Order creation failed; no order and no payment exist, retry is safe.
    #[error("order creation failed: {0}")]
    OrderFailed(#[source] BackendError),

    /// Payment creation failed after the order was created. The order
    /// remains on the backend without a confirmed payment; the cart is
    /// left untouched so the user can retry.
    #[error("payment creation failed for order {order_code}: {source}")]
    PaymentFailed {
        order_id: OrderId,
        order_code: OrderCode,
        #[source]
        source: BackendError,
    },
}

/// Drives the order-then-payment submission sequence.
pub struct SubmissionSequencer {
    backend: Arc<dyn CheckoutBackend>,
    cart: CartStore,
}

impl SubmissionSequencer {
    #[must_use]
    pub fn new(backend: Arc<dyn CheckoutBackend>, cart: CartStore) -> Self {
        Self { backend, cart }
    }

    /// Submit a prepared checkout with a card payment.
    ///
    /// Creates the order, then the payment referencing the returned order
    /// id. On success the cart is cleared exactly once. No idempotency key
    /// is attached: re-invoking after a failure creates fresh records.
    ///
    /// # Errors
    ///
    /// See [`SubmitError`]; on any error the cart is left unchanged.
    #[instrument(skip(self, ctx, selection), fields(method = ?selection.method))]
    pub async fn submit(
        &self,
        ctx: CheckoutContext,
        selection: CardSelection,
    ) -> Result<Receipt, SubmitError> {
        if selection.method == PaymentMethod::Gateway {
            return Err(SubmitError::UnsupportedMethod(selection.method));
        }

        // Client-side validation; a bad field never reaches the network
        let card = validate_card(&selection.details)?;
        let installments = effective_installments(selection.method, selection.installments);

        let order = build_order(&ctx);
        let record = self
            .backend
            .create_order(&order)
            .await
            .map_err(SubmitError::OrderFailed)?;
        info!(order_id = %record.id, code = %record.code, "order created");

        // Invariant: the payment references the id returned above; this
        // call cannot be reached before order creation succeeded
        let payment = NewPayment {
            order_id: record.id,
            method: selection.method,
            amount: record.total,
            installments,
            card: Some(card),
            preference_id: None,
        };

        if let Err(source) = self.backend.create_payment(&payment).await {
            warn!(order_id = %record.id, error = %source, "payment creation failed after order creation");
            return Err(SubmitError::PaymentFailed {
                order_id: record.id,
                order_code: record.code,
                source,
            });
        }

        self.cart.clear();
        info!(order_id = %record.id, "payment created, cart cleared");

        Ok(Receipt {
            order_id: record.id,
            order_code: record.code,
            total: record.total,
            method: selection.method,
            installments,
        })
    }
}

/// Build the order-creation request from the checkout snapshot.
///
/// Shared with the gateway bridge, which creates orders the same way
/// before requesting a preference.
pub(crate) fn build_order(ctx: &CheckoutContext) -> NewOrder {
    NewOrder {
        user_id: ctx.user_id,
        address_id: ctx.delivery_address_id,
        code: OrderCode::generate(),
        items: ctx
            .lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect(),
        subtotal: ctx.subtotal,
        delivery_fee: ctx.delivery_fee,
        discount: ctx.discount,
        total: ctx.total,
    }
}

/// Validate raw card fields into the submission payload.
fn validate_card(details: &CardDetails) -> Result<CardPayload, CardError> {
    let number = CardNumber::parse(&details.number)?;
    validate_holder_name(&details.holder_name)?;
    let expiry = Expiry::parse(&details.expiry)?;
    let today = Utc::now();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // month 1-12, year mod 100
    if expiry.is_past(today.month() as u8, (today.year() % 100) as u8) {
        return Err(CardError::Expired);
    }
    validate_security_code(&details.security_code)?;
    let document = Document::parse(&details.document)?;

    Ok(CardPayload {
        masked_number: number.masked(),
        holder_name: details.holder_name.trim().to_string(),
        expiry: expiry.to_string(),
        security_code: details.security_code.clone(),
        document: document.as_digits().to_string(),
    })
}

/// Installments are only meaningful for credit; debit is forced to 1.
const fn effective_installments(method: PaymentMethod, requested: u32) -> u32 {
    if method.supports_installments() && requested >= 1 {
        requested
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{
        OrderRecord, PaymentRecord, PreferenceRequest, PreferenceResponse,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use zentra_core::{
        AddressId, PaymentId, PaymentStatus, PreferenceId, ProductId, UserId,
    };

    fn valid_details() -> CardDetails {
        CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            holder_name: "MARIA A SILVA".to_string(),
            expiry: "09/39".to_string(),
            security_code: "123".to_string(),
            document: "123.456.789-09".to_string(),
        }
    }

    fn context() -> CheckoutContext {
        let total = Money::new(dec!(39.80));
        CheckoutContext {
            user_id: UserId::generate(),
            delivery_address_id: AddressId::generate(),
            lines: vec![crate::cart::CartLine {
                product_id: ProductId::generate(),
                name: "Dipirona 500mg".to_string(),
                quantity: 2,
                unit_price: Money::new(dec!(19.90)),
            }],
            subtotal: total,
            delivery_fee: Money::ZERO,
            discount: Money::ZERO,
            total,
        }
    }

    /// Backend double that records call order and can fail on demand.
    #[derive(Default)]
    struct StubBackend {
        calls: Mutex<Vec<&'static str>>,
        fail_order: bool,
        fail_payment: bool,
    }

    impl StubBackend {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CheckoutBackend for StubBackend {
        async fn create_order(&self, order: &NewOrder) -> Result<OrderRecord, BackendError> {
            self.calls.lock().unwrap().push("create_order");
            if self.fail_order {
                return Err(BackendError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(OrderRecord {
                id: OrderId::generate(),
                code: order.code.clone(),
                total: order.total,
                created_at: Utc::now(),
            })
        }

        async fn create_payment(
            &self,
            payment: &NewPayment,
        ) -> Result<PaymentRecord, BackendError> {
            self.calls.lock().unwrap().push("create_payment");
            if self.fail_payment {
                return Err(BackendError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(PaymentRecord {
                id: PaymentId::generate(),
                order_id: payment.order_id,
                status: PaymentStatus::Pending,
            })
        }

        async fn create_preference(
            &self,
            _request: &PreferenceRequest,
        ) -> Result<PreferenceResponse, BackendError> {
            self.calls.lock().unwrap().push("create_preference");
            Ok(PreferenceResponse {
                preference_id: PreferenceId::new("pref-1"),
                init_point: "https://gateway.test/checkout".to_string(),
            })
        }

        async fn payment_status(
            &self,
            _preference_id: &PreferenceId,
        ) -> Result<Option<PaymentStatus>, BackendError> {
            self.calls.lock().unwrap().push("payment_status");
            Ok(None)
        }
    }

    fn selection(method: PaymentMethod, installments: u32) -> CardSelection {
        CardSelection {
            method,
            details: valid_details(),
            installments,
        }
    }

    #[tokio::test]
    async fn payment_is_created_strictly_after_order() {
        let backend = Arc::new(StubBackend::default());
        let sequencer = SubmissionSequencer::new(backend.clone(), CartStore::in_memory());

        sequencer
            .submit(context(), selection(PaymentMethod::CartaoCredito, 3))
            .await
            .unwrap();

        assert_eq!(backend.calls(), vec!["create_order", "create_payment"]);
    }

    #[tokio::test]
    async fn invalid_card_makes_no_network_calls() {
        let backend = Arc::new(StubBackend::default());
        let sequencer = SubmissionSequencer::new(backend.clone(), CartStore::in_memory());

        let mut bad = selection(PaymentMethod::CartaoCredito, 1);
        bad.details.document = "123".to_string();

        let err = sequencer.submit(context(), bad).await.unwrap_err();
        assert!(matches!(err, SubmitError::Card(CardError::InvalidDocument(3))));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn expired_card_makes_no_network_calls() {
        let backend = Arc::new(StubBackend::default());
        let sequencer = SubmissionSequencer::new(backend.clone(), CartStore::in_memory());

        let mut expired = selection(PaymentMethod::CartaoCredito, 1);
        expired.details.expiry = "01/20".to_string();

        let err = sequencer.submit(context(), expired).await.unwrap_err();
        assert!(matches!(err, SubmitError::Card(CardError::Expired)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn gateway_method_is_rejected_up_front() {
        let backend = Arc::new(StubBackend::default());
        let sequencer = SubmissionSequencer::new(backend.clone(), CartStore::in_memory());

        let err = sequencer
            .submit(context(), selection(PaymentMethod::Gateway, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::UnsupportedMethod(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn order_failure_aborts_before_payment() {
        let backend = Arc::new(StubBackend {
            fail_order: true,
            ..StubBackend::default()
        });
        let sequencer = SubmissionSequencer::new(backend.clone(), CartStore::in_memory());

        let err = sequencer
            .submit(context(), selection(PaymentMethod::CartaoCredito, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::OrderFailed(_)));
        assert_eq!(backend.calls(), vec!["create_order"]);
    }

    #[tokio::test]
    async fn payment_failure_reports_the_created_order() {
        let backend = Arc::new(StubBackend {
            fail_payment: true,
            ..StubBackend::default()
        });
        let sequencer = SubmissionSequencer::new(backend.clone(), CartStore::in_memory());

        let err = sequencer
            .submit(context(), selection(PaymentMethod::CartaoDebito, 1))
            .await
            .unwrap_err();
        match err {
            SubmitError::PaymentFailed { order_code, .. } => {
                assert!(order_code.as_str().starts_with("ZEN-"));
            }
            other => panic!("expected PaymentFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn debit_forces_single_installment() {
        let backend = Arc::new(StubBackend::default());
        let sequencer = SubmissionSequencer::new(backend, CartStore::in_memory());

        let receipt = sequencer
            .submit(context(), selection(PaymentMethod::CartaoDebito, 6))
            .await
            .unwrap();
        assert_eq!(receipt.installments, 1);
    }

    #[tokio::test]
    async fn credit_keeps_requested_installments() {
        let backend = Arc::new(StubBackend::default());
        let sequencer = SubmissionSequencer::new(backend, CartStore::in_memory());

        let receipt = sequencer
            .submit(context(), selection(PaymentMethod::CartaoCredito, 6))
            .await
            .unwrap();
        assert_eq!(receipt.installments, 6);
    }
}
