//! Payment-status polling after the hosted-checkout handoff.
//!
//! When control returns from the external browser session the payment
//! outcome is unknown; the poller queries the backend for the gateway's
//! last known status until a terminal status or a wall-clock timeout is
//! reached.
//!
//! # State machine
//!
//! States are [`PollStatus`]: `checking` (initial) and `pending` keep the
//! interval alive; `approved`, `rejected`, `cancelled`, and `failed` are
//! terminal. One status query fires immediately on start, then every poll
//! interval. Terminal statuses emit exactly one navigation event after the
//! configured redirect delay; the timeout emits exactly one
//! [`PollEvent::TimedOut`] and stops all querying.
//!
//! # Cancellation
//!
//! Every timer armed here is owned by one spawned task, and
//! [`PollHandle::stop`] (or dropping the handle) aborts that task - both
//! the interval and the timeout die with it, so nothing fires after the
//! screen is gone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use zentra_core::{OrderId, PollStatus, PreferenceId};

use crate::backend::CheckoutBackend;
use crate::config::CheckoutConfig;

/// Timer durations for one polling session.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: std::time::Duration,
    pub timeout: std::time::Duration,
    pub redirect_delay: std::time::Duration,
}

impl From<&CheckoutConfig> for PollerConfig {
    fn from(config: &CheckoutConfig) -> Self {
        Self {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
            redirect_delay: config.redirect_delay,
        }
    }
}

/// Navigation events emitted by the poller, each at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Payment approved; navigate to the success view.
    Success { order_id: OrderId },
    /// Payment rejected or cancelled; navigate back to the payment-method
    /// screen.
    ReturnToPayment,
    /// The wall-clock timeout elapsed with no terminal status; surface a
    /// timeout notice and navigate to order history.
    TimedOut,
    /// A status query errored; polling stopped, the user must re-trigger.
    QueryFailed(String),
}

/// Starts payment-status polling sessions.
pub struct PaymentPoller;

impl PaymentPoller {
    /// Start polling for the given preference.
    ///
    /// Returns a [`PollHandle`] scoped to the screen instance; the handle
    /// must be stopped (or dropped) on teardown.
    #[must_use]
    pub fn start(
        backend: Arc<dyn CheckoutBackend>,
        preference_id: PreferenceId,
        order_id: OrderId,
        config: PollerConfig,
    ) -> PollHandle {
        let (status_tx, status_rx) = watch::channel(PollStatus::Checking);
        let (event_tx, event_rx) = mpsc::channel(4);
        let started_at = Utc::now();

        let task = tokio::spawn(run_poll_loop(
            backend,
            preference_id.clone(),
            order_id,
            config,
            status_tx,
            event_tx,
        ));

        PollHandle {
            preference_id,
            order_id,
            started_at,
            status_rx,
            event_rx,
            task,
        }
    }
}

/// A running polling session.
///
/// Dropping the handle aborts the underlying task, cancelling the interval
/// and timeout timers with it.
pub struct PollHandle {
    preference_id: PreferenceId,
    order_id: OrderId,
    started_at: DateTime<Utc>,
    status_rx: watch::Receiver<PollStatus>,
    event_rx: mpsc::Receiver<PollEvent>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// The preference being watched.
    #[must_use]
    pub const fn preference_id(&self) -> &PreferenceId {
        &self.preference_id
    }

    /// The order the payment belongs to.
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// When this polling session began.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current poll status.
    #[must_use]
    pub fn status(&self) -> PollStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes (e.g., for the waiting screen).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollStatus> {
        self.status_rx.clone()
    }

    /// Receive the next navigation event, or `None` once the session is
    /// over and all events were consumed.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.event_rx.recv().await
    }

    /// Stop polling: aborts the task, cancelling the interval and timeout
    /// timers. Idempotent; safe to call on an already-finished session.
    pub fn stop(&mut self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_poll_loop(
    backend: Arc<dyn CheckoutBackend>,
    preference_id: PreferenceId,
    order_id: OrderId,
    config: PollerConfig,
    status_tx: watch::Sender<PollStatus>,
    event_tx: mpsc::Sender<PollEvent>,
) {
    let deadline = tokio::time::sleep(config.timeout);
    tokio::pin!(deadline);

    // First tick fires immediately: one query on screen entry
    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = &mut deadline => {
                warn!(preference_id = %preference_id, "payment poll timed out");
                let _ = event_tx.send(PollEvent::TimedOut).await;
                return;
            }
            _ = interval.tick() => {
                match backend.payment_status(&preference_id).await {
                    Ok(Some(payment_status)) => {
                        let status = PollStatus::from(payment_status);
                        status_tx.send_replace(status);
                        if status.is_terminal() {
                            info!(preference_id = %preference_id, ?status, "payment reached terminal status");
                            tokio::time::sleep(config.redirect_delay).await;
                            let event = if status == PollStatus::Approved {
                                PollEvent::Success { order_id }
                            } else {
                                PollEvent::ReturnToPayment
                            };
                            let _ = event_tx.send(event).await;
                            return;
                        }
                    }
                    // No payment row yet: webhook has not landed, keep waiting
                    Ok(None) => {
                        debug!(preference_id = %preference_id, "no payment row yet");
                        status_tx.send_replace(PollStatus::Pending);
                    }
                    Err(e) => {
                        warn!(preference_id = %preference_id, error = %e, "payment status query failed");
                        status_tx.send_replace(PollStatus::Failed);
                        let _ = event_tx.send(PollEvent::QueryFailed(e.to_string())).await;
                        return;
                    }
                }
            }
        }
    }
}
