//! Application state shared across checkout screens.

use std::sync::{Arc, RwLock};

use crate::backend::{BackendClient, CheckoutBackend};
use crate::cart::CartStore;
use crate::checkout::{CheckoutContext, PrepareError, SubmissionSequencer, prepare_checkout};
use crate::config::CheckoutConfig;
use crate::gateway::{BrowserOpener, GatewayBridge};
use crate::poller::{PaymentPoller, PollHandle, PollerConfig};
use crate::session::Session;
use zentra_core::{OrderId, PreferenceId};

/// Shared checkout services.
///
/// Cheaply cloneable via `Arc`; screens receive a clone instead of reaching
/// for ambient globals. Bundles configuration, the backend client, the cart
/// store, and the current session.
#[derive(Clone)]
pub struct CheckoutServices {
    inner: Arc<CheckoutServicesInner>,
}

struct CheckoutServicesInner {
    config: CheckoutConfig,
    backend: Arc<dyn CheckoutBackend>,
    cart: CartStore,
    session: RwLock<Session>,
}

impl CheckoutServices {
    /// Create services backed by the real backend client.
    #[must_use]
    pub fn new(config: CheckoutConfig, cart: CartStore) -> Self {
        let backend: Arc<dyn CheckoutBackend> = Arc::new(BackendClient::new(&config));
        Self::with_backend(config, backend, cart)
    }

    /// Create services with an injected backend (tests, previews).
    #[must_use]
    pub fn with_backend(
        config: CheckoutConfig,
        backend: Arc<dyn CheckoutBackend>,
        cart: CartStore,
    ) -> Self {
        Self {
            inner: Arc::new(CheckoutServicesInner {
                config,
                backend,
                cart,
                session: RwLock::new(Session::anonymous()),
            }),
        }
    }

    /// Get a reference to the checkout configuration.
    #[must_use]
    pub fn config(&self) -> &CheckoutConfig {
        &self.inner.config
    }

    /// Get the backend seam.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn CheckoutBackend> {
        Arc::clone(&self.inner.backend)
    }

    /// Get a handle to the cart store.
    #[must_use]
    pub fn cart(&self) -> CartStore {
        self.inner.cart.clone()
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner
            .session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Replace the session (sign-in, sign-out, address added).
    pub fn set_session(&self, session: Session) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = session;
    }

    /// Validate preconditions and snapshot the cart for one checkout
    /// attempt.
    ///
    /// # Errors
    ///
    /// See [`prepare_checkout`].
    pub fn prepare_checkout(&self) -> Result<CheckoutContext, PrepareError> {
        prepare_checkout(&self.session(), &self.inner.cart)
    }

    /// Sequencer for the card payment path.
    #[must_use]
    pub fn sequencer(&self) -> SubmissionSequencer {
        SubmissionSequencer::new(self.backend(), self.cart())
    }

    /// Bridge for the hosted-gateway payment path.
    #[must_use]
    pub fn gateway_bridge(&self, opener: Arc<dyn BrowserOpener>) -> GatewayBridge {
        GatewayBridge::new(self.backend(), opener)
    }

    /// Start polling a payment's status after returning from the hosted
    /// checkout.
    #[must_use]
    pub fn start_payment_poll(
        &self,
        preference_id: PreferenceId,
        order_id: OrderId,
    ) -> PollHandle {
        PaymentPoller::start(
            self.backend(),
            preference_id,
            order_id,
            PollerConfig::from(&self.inner.config),
        )
    }
}
