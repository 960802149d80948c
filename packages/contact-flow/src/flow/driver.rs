//! Event-loop driver for the flow.
//!
//! The flow itself is a plain state machine; this module gives it the
//! single-threaded cooperative scheduling described in its contract. One
//! tokio task owns the [`ContactVerificationFlow`] and multiplexes handle
//! events against the debounce timer. Existence checks run off-task so the
//! loop keeps accepting input while one is in flight, but at most one check
//! and one OTP request are ever outstanding.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::error::FlowError;
use crate::flow::events::FlowEvent;
use crate::flow::form::IdentifierKind;
use crate::flow::{ContactVerificationFlow, FlowState, SubmitOutcome};

/// Quiet period after the last input change before the existence check
/// fires. Rapid keystrokes within this window coalesce into one check.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

const EVENT_BUFFER: usize = 32;

/// Spawns and owns the flow's event loop.
pub struct FlowDriver;

impl FlowDriver {
    /// Move the flow onto its own task. The flow should already be
    /// initialized and started.
    pub fn spawn(flow: ContactVerificationFlow) -> FlowHandle {
        Self::spawn_with_debounce(flow, DEBOUNCE_DELAY)
    }

    pub fn spawn_with_debounce(flow: ContactVerificationFlow, debounce: Duration) -> FlowHandle {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(flow.state());
        tokio::spawn(run(flow, rx, tx.clone(), state_tx, debounce));
        FlowHandle {
            tx,
            state: state_rx,
        }
    }
}

/// Channel-based handle to a running flow.
#[derive(Clone)]
pub struct FlowHandle {
    tx: mpsc::Sender<FlowEvent>,
    state: watch::Receiver<FlowState>,
}

impl FlowHandle {
    /// Report an input change. Fire-and-forget; the check, if any, fires
    /// after the debounce delay.
    pub async fn input_changed(&self, value: impl Into<String>, kind: IdentifierKind) {
        let _ = self
            .tx
            .send(FlowEvent::InputChanged {
                value: value.into(),
                kind,
            })
            .await;
    }

    /// Explicit submit action.
    pub async fn submit(&self) -> Result<SubmitOutcome, FlowError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(FlowEvent::Submit { reply })
            .await
            .map_err(|_| FlowError::DriverGone)?;
        response.await.map_err(|_| FlowError::DriverGone)
    }

    /// Report OTP verification success; returns the redirect target for a
    /// full-document navigation.
    pub async fn otp_succeeded(&self) -> Result<String, FlowError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(FlowEvent::OtpSucceeded { reply })
            .await
            .map_err(|_| FlowError::DriverGone)?;
        response.await.map_err(|_| FlowError::DriverGone)
    }

    /// Report OTP verification failure. Resolves once the flow has reset
    /// and re-armed.
    pub async fn otp_failed(&self) -> Result<(), FlowError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(FlowEvent::OtpFailed { reply })
            .await
            .map_err(|_| FlowError::DriverGone)?;
        response.await.map_err(|_| FlowError::DriverGone)
    }

    /// Latest published state snapshot.
    pub fn state(&self) -> FlowState {
        *self.state.borrow()
    }

    /// Subscribe to state snapshots.
    pub fn watch_state(&self) -> watch::Receiver<FlowState> {
        self.state.clone()
    }

    /// Stop the event loop.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(FlowEvent::Shutdown).await;
    }
}

async fn run(
    mut flow: ContactVerificationFlow,
    mut rx: mpsc::Receiver<FlowEvent>,
    tx: mpsc::Sender<FlowEvent>,
    state_tx: watch::Sender<FlowState>,
    debounce: Duration,
) {
    // Pending debounce deadline; None when no check is scheduled.
    let mut deadline: Option<Instant> = None;
    // At most one lookup in flight. A deadline firing during flight is
    // remembered and re-evaluated once the response lands.
    let mut in_flight = false;
    let mut deferred_check = false;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    FlowEvent::InputChanged { value, kind } => {
                        if flow.input_changed(&value, kind) {
                            deadline = Some(Instant::now() + debounce);
                        } else if !flow.form().is_valid() {
                            // Invalid input cancels any scheduled check; a
                            // duplicate report of the same value does not.
                            deadline = None;
                            deferred_check = false;
                        }
                    }
                    FlowEvent::Submit { reply } => {
                        let outcome = flow.submit().await;
                        if matches!(outcome, SubmitOutcome::ChallengeIssued(_)) {
                            deadline = None;
                            deferred_check = false;
                        }
                        let _ = reply.send(outcome);
                    }
                    FlowEvent::OtpSucceeded { reply } => {
                        let _ = reply.send(flow.otp_validation_succeeded());
                    }
                    FlowEvent::OtpFailed { reply } => {
                        flow.otp_validation_failed();
                        deadline = None;
                        deferred_check = false;
                        let _ = reply.send(());
                    }
                    FlowEvent::LookupDone { generation, result } => {
                        in_flight = false;
                        flow.apply_lookup(generation, result);
                        if deferred_check {
                            deferred_check = false;
                            in_flight = dispatch_lookup(&flow, &tx);
                        }
                    }
                    FlowEvent::Shutdown => break,
                }
                let _ = state_tx.send(flow.state());
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                if in_flight {
                    deferred_check = true;
                } else {
                    in_flight = dispatch_lookup(&flow, &tx);
                }
            }
        }
    }
    debug!("flow driver stopped");
}

/// Kick off one existence check on its own task; the result comes back as a
/// [`FlowEvent::LookupDone`]. Returns whether a check was dispatched.
fn dispatch_lookup(flow: &ContactVerificationFlow, tx: &mpsc::Sender<FlowEvent>) -> bool {
    let Some((generation, key)) = flow.begin_lookup() else {
        return false;
    };
    let users = flow.user_lookup();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = users.get_user_by_key(&key).await;
        let _ = tx
            .send(FlowEvent::LookupDone { generation, result })
            .await;
    });
    true
}
