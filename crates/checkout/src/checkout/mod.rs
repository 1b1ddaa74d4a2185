//! Checkout preparation and order/payment submission.
//!
//! [`prepare_checkout`] validates preconditions and snapshots the cart into
//! a [`CheckoutContext`]; [`SubmissionSequencer::submit`] then drives the
//! two-step order-then-payment creation for the card path. The hosted
//! gateway path consumes the same context through
//! [`crate::gateway::GatewayBridge`].

mod preparer;
mod sequencer;

pub use preparer::{CheckoutContext, PrepareError, prepare_checkout};
pub use sequencer::{CardDetails, CardSelection, Receipt, SubmissionSequencer, SubmitError};

pub(crate) use sequencer::build_order;
