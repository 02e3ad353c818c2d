//! The dispatcher
//!
//! `dispatch` never fails back into the caller. A successful delivery is
//! traced; a failed one is logged and handed to the retry worker, which
//! re-attempts with a growing delay and gives up loudly after the attempt
//! cap. The state transition that produced the event has already been
//! committed by then, so the worst case is a late notification, never a
//! rolled-back adjudication.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::audit::{AuditRecord, SYSTEM_ACTOR};
use crate::event::EngineEvent;
use crate::notification::Notification;
use crate::ports::{AuditSink, NotificationSink};

/// Attempts before a side effect is dropped
const MAX_DELIVERY_ATTEMPTS: u32 = 5;

/// A side effect queued for redelivery
#[derive(Debug, Clone)]
enum SideEffect {
    Notify(Notification),
    Audit(AuditRecord),
}

#[derive(Debug)]
struct RetryItem {
    effect: SideEffect,
    attempts: u32,
}

/// Emits notifications and audit records for domain events
#[derive(Clone)]
pub struct Dispatcher {
    notifications: Arc<dyn NotificationSink>,
    audits: Arc<dyn AuditSink>,
    retry_tx: mpsc::UnboundedSender<RetryItem>,
}

impl Dispatcher {
    /// Creates a dispatcher and its retry worker
    ///
    /// Spawn the worker (`tokio::spawn(worker.run())`) to get redelivery;
    /// without it, failed effects stay queued and are simply lost on
    /// shutdown.
    pub fn new(
        notifications: Arc<dyn NotificationSink>,
        audits: Arc<dyn AuditSink>,
    ) -> (Self, RetryWorker) {
        Self::with_retry_delay(notifications, audits, Duration::from_secs(5))
    }

    /// Creates a dispatcher with a custom retry base delay
    pub fn with_retry_delay(
        notifications: Arc<dyn NotificationSink>,
        audits: Arc<dyn AuditSink>,
        base_delay: Duration,
    ) -> (Self, RetryWorker) {
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            notifications: notifications.clone(),
            audits: audits.clone(),
            retry_tx: retry_tx.clone(),
        };
        let worker = RetryWorker {
            notifications,
            audits,
            retry_tx,
            retry_rx,
            base_delay,
        };
        (dispatcher, worker)
    }

    /// Emits the audit record and notification for a committed transition
    pub async fn dispatch(&self, event: &EngineEvent) {
        debug!(
            event_type = event.event_type(),
            entity = %event.entity_id(),
            "dispatching side effects"
        );

        if let Some(record) = AuditRecord::from_event(event, SYSTEM_ACTOR) {
            self.attempt(SideEffect::Audit(record)).await;
        }
        if let Some(notification) = Notification::from_event(event) {
            self.attempt(SideEffect::Notify(notification)).await;
        }
    }

    /// Sends a standalone notification (reminders from notify-only sweeps)
    pub async fn notify(&self, notification: Notification) {
        self.attempt(SideEffect::Notify(notification)).await;
    }

    async fn attempt(&self, effect: SideEffect) {
        let result = match &effect {
            SideEffect::Notify(notification) => {
                self.notifications.deliver(notification.clone()).await
            }
            SideEffect::Audit(record) => self.audits.record(record.clone()).await,
        };

        if let Err(source) = result {
            warn!(%source, "side-effect delivery failed, queueing for retry");
            // the receiver only disappears on shutdown; nothing left to do then
            let _ = self.retry_tx.send(RetryItem { effect, attempts: 1 });
        }
    }
}

/// Background redelivery loop for failed side effects
pub struct RetryWorker {
    notifications: Arc<dyn NotificationSink>,
    audits: Arc<dyn AuditSink>,
    retry_tx: mpsc::UnboundedSender<RetryItem>,
    retry_rx: mpsc::UnboundedReceiver<RetryItem>,
    base_delay: Duration,
}

impl RetryWorker {
    /// Runs until the process shuts down
    pub async fn run(mut self) {
        while let Some(item) = self.retry_rx.recv().await {
            tokio::time::sleep(self.base_delay * item.attempts).await;

            let result = match &item.effect {
                SideEffect::Notify(notification) => {
                    self.notifications.deliver(notification.clone()).await
                }
                SideEffect::Audit(record) => self.audits.record(record.clone()).await,
            };

            match result {
                Ok(()) => debug!(attempts = item.attempts, "side effect redelivered"),
                Err(source) if item.attempts + 1 < MAX_DELIVERY_ATTEMPTS => {
                    warn!(%source, attempts = item.attempts, "redelivery failed, requeueing");
                    let _ = self.retry_tx.send(RetryItem {
                        effect: item.effect,
                        attempts: item.attempts + 1,
                    });
                }
                Err(source) => {
                    error!(
                        %source,
                        attempts = item.attempts,
                        "side effect dropped after exhausting retries"
                    );
                }
            }
        }
    }
}
