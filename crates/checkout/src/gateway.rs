//! Hosted-checkout gateway bridge.
//!
//! The alternate payment path: create the order first (same ordering
//! invariant as the card path), mint a gateway preference sized to the
//! order total, and hand the user off to the hosted checkout URL in an
//! external browser session. The session itself is opaque - when control
//! returns to the app, success or failure is not yet known; the
//! [`crate::poller::PaymentPoller`] resolves it afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};
use zentra_core::{Money, OrderCode, OrderId, PaymentMethod, PreferenceId};

use crate::backend::types::{NewPayment, PreferenceRequest};
use crate::backend::{BackendError, CheckoutBackend};
use crate::checkout::CheckoutContext;

/// Opens the hosted checkout in an external browser context.
///
/// `open` suspends until the user returns control to the app; the result
/// says nothing about payment outcome, only that the handoff happened.
#[async_trait]
pub trait BrowserOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), GatewayError>;
}

/// Failures of the hosted-checkout handoff.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Order creation failed; nothing was created, retry is safe.
    #[error("order creation failed: {0}")]
    OrderFailed(#[source] BackendError),

    /// Preference minting failed after the order was created. Like the
    /// card path's partial failure, the order remains on the backend.
    #[error("preference creation failed for order {order_code}: {source}")]
    PreferenceFailed {
        order_id: OrderId,
        order_code: OrderCode,
        #[source]
        source: BackendError,
    },

    /// Recording the pending gateway payment failed.
    #[error("payment record creation failed for order {order_code}: {source}")]
    PaymentRecordFailed {
        order_id: OrderId,
        order_code: OrderCode,
        #[source]
        source: BackendError,
    },

    /// The external browser session could not be launched.
    #[error("failed to open external checkout: {0}")]
    Browser(String),
}

/// Everything the poller screen needs after the handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedCheckout {
    pub preference_id: PreferenceId,
    /// Hosted checkout URL (`init_point`).
    pub checkout_url: String,
    pub order_id: OrderId,
    pub order_code: OrderCode,
    pub total: Money,
}

/// Bridges checkout to the external payment gateway.
pub struct GatewayBridge {
    backend: Arc<dyn CheckoutBackend>,
    opener: Arc<dyn BrowserOpener>,
}

impl GatewayBridge {
    #[must_use]
    pub fn new(backend: Arc<dyn CheckoutBackend>, opener: Arc<dyn BrowserOpener>) -> Self {
        Self { backend, opener }
    }

    /// Create the order, mint a preference for it, and record the pending
    /// gateway payment.
    ///
    /// The order is created before the preference is requested; its
    /// human-facing code travels as the external reference so the backend
    /// webhook can link gateway events back to it.
    ///
    /// # Errors
    ///
    /// See [`GatewayError`]. The cart is never touched here; it is only
    /// cleared once the poller observes an approved payment.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn begin_checkout(&self, ctx: CheckoutContext) -> Result<HostedCheckout, GatewayError> {
        let order = crate::checkout::build_order(&ctx);
        let record = self
            .backend
            .create_order(&order)
            .await
            .map_err(GatewayError::OrderFailed)?;
        info!(order_id = %record.id, code = %record.code, "order created for hosted checkout");

        let preference = self
            .backend
            .create_preference(&PreferenceRequest {
                total: record.total,
                pedido_id: record.id,
                user_id: ctx.user_id,
                external_reference: record.code.clone(),
            })
            .await
            .map_err(|source| GatewayError::PreferenceFailed {
                order_id: record.id,
                order_code: record.code.clone(),
                source,
            })?;

        // Pending payment row up front, so the poller's status query has a
        // row to find once the webhook updates it
        let payment = NewPayment {
            order_id: record.id,
            method: PaymentMethod::Gateway,
            amount: record.total,
            installments: 1,
            card: None,
            preference_id: Some(preference.preference_id.clone()),
        };
        self.backend
            .create_payment(&payment)
            .await
            .map_err(|source| GatewayError::PaymentRecordFailed {
                order_id: record.id,
                order_code: record.code.clone(),
                source,
            })?;

        Ok(HostedCheckout {
            preference_id: preference.preference_id,
            checkout_url: preference.init_point,
            order_id: record.id,
            order_code: record.code,
            total: record.total,
        })
    }

    /// Launch the external browser session and suspend until the user
    /// returns to the app.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Browser`] if the handoff could not start.
    #[instrument(skip(self, hosted), fields(order_id = %hosted.order_id))]
    pub async fn open_checkout(&self, hosted: &HostedCheckout) -> Result<(), GatewayError> {
        self.opener.open(&hosted.checkout_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::{
        NewOrder, OrderRecord, PaymentRecord, PreferenceResponse,
    };
    use crate::cart::CartLine;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use zentra_core::{AddressId, PaymentId, PaymentStatus, ProductId, UserId};

    fn context() -> CheckoutContext {
        let total = Money::new(dec!(54.90));
        CheckoutContext {
            user_id: UserId::generate(),
            delivery_address_id: AddressId::generate(),
            lines: vec![CartLine {
                product_id: ProductId::generate(),
                name: "Protetor solar FPS 50".to_string(),
                quantity: 1,
                unit_price: total,
            }],
            subtotal: total,
            delivery_fee: Money::ZERO,
            discount: Money::ZERO,
            total,
        }
    }

    #[derive(Default)]
    struct StubBackend {
        calls: Mutex<Vec<&'static str>>,
        seen_reference: Mutex<Option<OrderCode>>,
    }

    #[async_trait]
    impl CheckoutBackend for StubBackend {
        async fn create_order(&self, order: &NewOrder) -> Result<OrderRecord, BackendError> {
            self.calls.lock().unwrap().push("create_order");
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
            assert_eq!(payment.method, PaymentMethod::Gateway);
            assert_eq!(payment.installments, 1);
            Ok(PaymentRecord {
                id: PaymentId::generate(),
                order_id: payment.order_id,
                status: PaymentStatus::Pending,
            })
        }

        async fn create_preference(
            &self,
            request: &PreferenceRequest,
        ) -> Result<PreferenceResponse, BackendError> {
            self.calls.lock().unwrap().push("create_preference");
            *self.seen_reference.lock().unwrap() = Some(request.external_reference.clone());
            Ok(PreferenceResponse {
                preference_id: PreferenceId::new("pref-42"),
                init_point: "https://gateway.test/init".to_string(),
            })
        }

        async fn payment_status(
            &self,
            _preference_id: &PreferenceId,
        ) -> Result<Option<PaymentStatus>, BackendError> {
            Ok(None)
        }
    }

    struct NoopOpener(Mutex<Vec<String>>);

    #[async_trait]
    impl BrowserOpener for NoopOpener {
        async fn open(&self, url: &str) -> Result<(), GatewayError> {
            self.0.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn order_precedes_preference_and_payment_record() {
        let backend = Arc::new(StubBackend::default());
        let bridge = GatewayBridge::new(backend.clone(), Arc::new(NoopOpener(Mutex::default())));

        let hosted = bridge.begin_checkout(context()).await.unwrap();

        assert_eq!(
            *backend.calls.lock().unwrap(),
            vec!["create_order", "create_preference", "create_payment"]
        );
        assert_eq!(hosted.preference_id, PreferenceId::new("pref-42"));
        assert_eq!(hosted.checkout_url, "https://gateway.test/init");
    }

    #[tokio::test]
    async fn order_code_travels_as_external_reference() {
        let backend = Arc::new(StubBackend::default());
        let bridge = GatewayBridge::new(backend.clone(), Arc::new(NoopOpener(Mutex::default())));

        let hosted = bridge.begin_checkout(context()).await.unwrap();

        let seen = backend.seen_reference.lock().unwrap().clone().unwrap();
        assert_eq!(seen, hosted.order_code);
    }

    #[tokio::test]
    async fn open_checkout_passes_the_init_point() {
        let backend = Arc::new(StubBackend::default());
        let opener = Arc::new(NoopOpener(Mutex::default()));
        let bridge = GatewayBridge::new(backend, opener.clone());

        let hosted = bridge.begin_checkout(context()).await.unwrap();
        bridge.open_checkout(&hosted).await.unwrap();

        assert_eq!(*opener.0.lock().unwrap(), vec!["https://gateway.test/init"]);
    }
}
