//! Shared test support for Zentra checkout integration tests.
//!
//! The whole flow runs in-process: screens' worth of behavior is exercised
//! through [`zentra_checkout::state::CheckoutServices`] wired to the
//! [`RecordingBackend`] double, which logs every remote call in order and
//! can be scripted to fail or to walk a payment through gateway statuses.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use zentra_checkout::backend::types::{
    NewOrder, NewPayment, OrderRecord, PaymentRecord, PreferenceRequest, PreferenceResponse,
};
use zentra_checkout::backend::{BackendError, CheckoutBackend};
use zentra_checkout::cart::Product;
use zentra_checkout::session::{Session, UserIdentity};
use zentra_core::{
    Money, OrderId, PaymentId, PaymentStatus, PreferenceId, ProductId, UserId,
};

/// A remote call observed by the recording backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    CreateOrder,
    CreatePayment,
    CreatePreference,
    PaymentStatus,
}

/// Call-recording backend double.
///
/// Every call is appended to an ordered log; creation requests are kept for
/// assertions. Status queries pop a scripted list and then repeat its last
/// entry.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    pub orders: Mutex<Vec<NewOrder>>,
    pub payments: Mutex<Vec<NewPayment>>,
    pub preferences: Mutex<Vec<PreferenceRequest>>,
    status_script: Mutex<Vec<Option<PaymentStatus>>>,
    fail_orders: AtomicBool,
    fail_payments: AtomicBool,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the sequence of status-query responses; the last entry
    /// repeats forever.
    pub fn script_statuses(&self, statuses: Vec<Option<PaymentStatus>>) {
        *self.status_script.lock().unwrap() = statuses;
    }

    pub fn fail_orders(&self) {
        self.fail_orders.store(true, Ordering::SeqCst);
    }

    pub fn fail_payments(&self) {
        self.fail_payments.store(true, Ordering::SeqCst);
    }

    /// The ordered log of remote calls.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn remote_failure() -> BackendError {
        BackendError::Api {
            status: 500,
            body: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl CheckoutBackend for RecordingBackend {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderRecord, BackendError> {
        self.record(Call::CreateOrder);
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(Self::remote_failure());
        }
        self.orders.lock().unwrap().push(order.clone());
        Ok(OrderRecord {
            id: OrderId::generate(),
            code: order.code.clone(),
            total: order.total,
            created_at: Utc::now(),
        })
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<PaymentRecord, BackendError> {
        self.record(Call::CreatePayment);
        if self.fail_payments.load(Ordering::SeqCst) {
            return Err(Self::remote_failure());
        }
        self.payments.lock().unwrap().push(payment.clone());
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
        self.record(Call::CreatePreference);
        self.preferences.lock().unwrap().push(request.clone());
        Ok(PreferenceResponse {
            preference_id: PreferenceId::new(format!("pref-{}", request.pedido_id)),
            init_point: "https://gateway.test/checkout/session".to_string(),
        })
    }

    async fn payment_status(
        &self,
        _preference_id: &PreferenceId,
    ) -> Result<Option<PaymentStatus>, BackendError> {
        self.record(Call::PaymentStatus);
        let mut script = self.status_script.lock().unwrap();
        Ok(if script.len() > 1 {
            script.remove(0)
        } else {
            script.first().copied().flatten()
        })
    }
}

/// A catalog product priced in reais.
#[must_use]
pub fn product(name: &str, price: Decimal) -> Product {
    Product {
        id: ProductId::generate(),
        name: name.to_string(),
        price: Money::new(price),
    }
}

/// A signed-in session with a delivery address on file.
#[must_use]
pub fn session_with_address() -> Session {
    Session::signed_in(
        UserIdentity {
            id: UserId::generate(),
            email: "ana@example.com".to_string(),
        },
        Some(zentra_core::AddressId::generate()),
    )
}

/// A signed-in session with no delivery address.
#[must_use]
pub fn session_without_address() -> Session {
    Session::signed_in(
        UserIdentity {
            id: UserId::generate(),
            email: "ana@example.com".to_string(),
        },
        None,
    )
}
