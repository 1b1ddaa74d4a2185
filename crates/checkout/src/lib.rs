//! Zentra checkout library.
//!
//! Implements the cart-to-checkout and payment-status reconciliation flow
//! for the Zentra storefront: cart aggregation, checkout preparation,
//! order/payment submission sequencing, hosted-gateway handoff, and
//! asynchronous payment-status polling.
//!
//! # Architecture
//!
//! The mobile shell binds screens to the types exposed here; everything
//! remote goes through the [`backend::CheckoutBackend`] seam, so the whole
//! flow runs in-process against test doubles.
//!
//! Control flow: [`cart::CartStore`] → [`checkout::prepare_checkout`] →
//! [`checkout::SubmissionSequencer`] (card path) or [`gateway::GatewayBridge`]
//! + [`poller::PaymentPoller`] (hosted-checkout path).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod gateway;
pub mod poller;
pub mod session;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Reads `RUST_LOG` for the filter, defaulting to `info`. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}
