//! Outbound notifications.
//!
//! The engine never talks to a mail server. After a ledger transaction
//! commits it pushes a [`Notification`] into a [`NotificationOutbox`]; a
//! [`NotificationWorker`] running on its own task drains the queue and hands
//! each event to a [`Notifier`], retrying failed deliveries according to a
//! [`RetryPolicy`]. Nothing on this path can fail or delay a committed
//! mutation.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinSet};

use crate::{PurchaseStatus, Team};

/// Who a notification is addressed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamContact {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&Team> for TeamContact {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            email: team.email.clone(),
        }
    }
}

/// One purchase line inside a notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedItem {
    pub purchase_id: i64,
    pub resource: String,
    pub quantity: i64,
    pub requested_quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    PurchaseReceived {
        team: TeamContact,
        items: Vec<NotifiedItem>,
    },
    PurchaseConfirmed {
        team: TeamContact,
        resource: String,
        quantity: i64,
    },
    PurchaseRejected {
        team: TeamContact,
        resource: String,
        quantity: i64,
    },
    BatchSummary {
        team: TeamContact,
        confirmed: Vec<NotifiedItem>,
        adjusted: Vec<NotifiedItem>,
        cancelled: Vec<NotifiedItem>,
    },
    ReturnProcessed {
        team: TeamContact,
        resource: String,
        quantity: i64,
        status: PurchaseStatus,
    },
}

impl Notification {
    pub fn team(&self) -> &TeamContact {
        match self {
            Self::PurchaseReceived { team, .. }
            | Self::PurchaseConfirmed { team, .. }
            | Self::PurchaseRejected { team, .. }
            | Self::BatchSummary { team, .. }
            | Self::ReturnProcessed { team, .. } => team,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PurchaseReceived { .. } => "purchase_received",
            Self::PurchaseConfirmed { .. } => "purchase_confirmed",
            Self::PurchaseRejected { .. } => "purchase_rejected",
            Self::BatchSummary { .. } => "batch_summary",
            Self::ReturnProcessed { .. } => "return_processed",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Self::PurchaseReceived { items, .. } if items.len() > 1 => {
                "Batch purchase request received".to_string()
            }
            Self::PurchaseReceived { .. } => "Purchase request received".to_string(),
            Self::PurchaseConfirmed { .. } => "Purchase confirmed".to_string(),
            Self::PurchaseRejected { .. } => "Purchase rejected".to_string(),
            Self::BatchSummary { .. } => "Your order has been processed".to_string(),
            Self::ReturnProcessed { .. } => "Resource return processed".to_string(),
        }
    }

    /// Plain-text body.
    pub fn body(&self) -> String {
        let greeting = format!("Hello {},\n\n", self.team().name);
        let text = match self {
            Self::PurchaseReceived { items, .. } => {
                let mut text = format!(
                    "Your purchase request for {} resource(s) has been recorded and is waiting for approval.\n",
                    items.len()
                );
                for item in items {
                    text.push_str(&format!("- {} (quantity: {})\n", item.resource, item.quantity));
                }
                text.push_str("You will receive another message once it has been processed.\n");
                text
            }
            Self::PurchaseConfirmed {
                resource, quantity, ..
            } => format!(
                "Your purchase has been confirmed:\n- Resource: {resource}\n- Quantity: {quantity}\n"
            ),
            Self::PurchaseRejected {
                resource, quantity, ..
            } => format!(
                "Your purchase request has been rejected:\n- Resource: {resource}\n- Quantity: {quantity}\nYour credit has been refunded.\n"
            ),
            Self::BatchSummary {
                confirmed,
                adjusted,
                cancelled,
                ..
            } => {
                let mut text = String::from("Your order has been processed. Summary:\n");
                if !confirmed.is_empty() {
                    text.push_str("\nConfirmed:\n");
                    for item in confirmed {
                        text.push_str(&format!("- {} (quantity: {})\n", item.resource, item.quantity));
                    }
                }
                if !adjusted.is_empty() {
                    text.push_str("\nApproved with adjustment:\n");
                    for item in adjusted {
                        text.push_str(&format!(
                            "- {} (requested: {}, approved: {})\n",
                            item.resource, item.requested_quantity, item.quantity
                        ));
                    }
                    text.push_str("The credit difference has been refunded.\n");
                }
                if !cancelled.is_empty() {
                    text.push_str("\nRejected:\n");
                    for item in cancelled {
                        text.push_str(&format!("- {} (quantity: {})\n", item.resource, item.quantity));
                    }
                    text.push_str("Your credit has been refunded.\n");
                }
                text
            }
            Self::ReturnProcessed {
                resource,
                quantity,
                status,
                ..
            } => format!(
                "Your return of {resource} (quantity: {quantity}) has been processed.\nPurchase status: {}\n",
                status.as_str()
            ),
        };
        format!("{greeting}{text}")
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivery backend (mail relay, webhook, log...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier writing every message to the log. Used when no real delivery
/// backend is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let team = notification.team();
        tracing::info!(
            kind = notification.kind(),
            team_id = team.id,
            to = %team.email,
            subject = %notification.subject(),
            "notification delivered"
        );
        Ok(())
    }
}

/// Queue size used by [`NotificationOutbox::channel`].
pub const OUTBOX_CAPACITY: usize = 1024;

/// Deliveries a [`NotificationWorker`] runs at the same time.
const MAX_IN_FLIGHT: usize = 16;

/// Sending half of the notification queue, owned by the engine.
#[derive(Clone, Debug, Default)]
pub struct NotificationOutbox {
    sender: Option<mpsc::Sender<Notification>>,
}

impl NotificationOutbox {
    /// Create an outbox and the receiver a [`NotificationWorker`] consumes.
    pub fn channel() -> (Self, mpsc::Receiver<Notification>) {
        Self::with_capacity(OUTBOX_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// An outbox that drops everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Queue `notification`. Never blocks and never fails the caller: a full
    /// queue or a stopped worker drops the notification with a warning.
    pub fn emit(&self, notification: Notification) {
        let Some(sender) = &self.sender else {
            tracing::debug!(kind = notification.kind(), "notifications disabled, dropping");
            return;
        };
        match sender.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(notification)) => {
                tracing::warn!(
                    kind = notification.kind(),
                    team_id = notification.team().id,
                    "notification outbox full, dropping notification"
                );
            }
            Err(mpsc::error::TrySendError::Closed(notification)) => {
                tracing::warn!(
                    kind = notification.kind(),
                    team_id = notification.team().id,
                    "notification worker gone, dropping notification"
                );
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total delivery attempts, the first one included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), doubling each time.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Drains the outbox and delivers every notification on its own task.
pub struct NotificationWorker {
    receiver: mpsc::Receiver<Notification>,
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<Notification>,
        notifier: Arc<dyn Notifier>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            receiver,
            notifier,
            policy,
        }
    }

    /// Run until every outbox clone is dropped, then wait for in-flight
    /// deliveries.
    pub async fn run(mut self) {
        let mut in_flight = JoinSet::new();
        while let Some(notification) = self.receiver.recv().await {
            while in_flight.try_join_next().is_some() {}
            if in_flight.len() >= MAX_IN_FLIGHT {
                in_flight.join_next().await;
            }
            let notifier = Arc::clone(&self.notifier);
            let policy = self.policy;
            in_flight.spawn(deliver_with_retry(notifier, notification, policy));
        }
        while in_flight.join_next().await.is_some() {}
        tracing::info!("notification worker stopped");
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

async fn deliver_with_retry(
    notifier: Arc<dyn Notifier>,
    notification: Notification,
    policy: RetryPolicy,
) -> bool {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        match notifier.deliver(&notification).await {
            Ok(()) => return true,
            Err(err) if attempt < attempts => {
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    kind = notification.kind(),
                    team_id = notification.team().id,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "notification delivery failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                tracing::error!(
                    kind = notification.kind(),
                    team_id = notification.team().id,
                    attempts,
                    error = %err,
                    "notification dropped after max retries"
                );
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn team() -> TeamContact {
        TeamContact {
            id: 3,
            name: "Rustaceans".to_string(),
            email: "crabs@example.com".to_string(),
        }
    }

    fn item(resource: &str, quantity: i64, requested_quantity: i64) -> NotifiedItem {
        NotifiedItem {
            purchase_id: 1,
            resource: resource.to_string(),
            quantity,
            requested_quantity,
        }
    }

    /// Fails the first `failures` deliveries, then records the rest.
    struct FlakyNotifier {
        failures: Mutex<u32>,
        delivered: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(NotifyError::Delivery("relay down".to_string()));
            }
            self.delivered.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(300));
        assert_eq!(policy.backoff(30), Duration::from_millis(300));
    }

    #[test]
    fn batch_summary_lists_every_section() {
        let notification = Notification::BatchSummary {
            team: team(),
            confirmed: vec![item("Raspberry Pi", 2, 2)],
            adjusted: vec![item("GPU hours", 3, 5)],
            cancelled: vec![item("Coffee", 1, 1)],
        };
        let body = notification.body();
        assert!(body.starts_with("Hello Rustaceans"));
        assert!(body.contains("- Raspberry Pi (quantity: 2)"));
        assert!(body.contains("- GPU hours (requested: 5, approved: 3)"));
        assert!(body.contains("- Coffee (quantity: 1)"));
        assert!(body.contains("credit difference has been refunded"));
    }

    #[test]
    fn empty_summary_sections_are_omitted() {
        let notification = Notification::BatchSummary {
            team: team(),
            confirmed: vec![item("Raspberry Pi", 2, 2)],
            adjusted: Vec::new(),
            cancelled: Vec::new(),
        };
        let body = notification.body();
        assert!(!body.contains("Rejected"));
        assert!(!body.contains("adjustment"));
    }

    #[test]
    fn batch_receipt_has_its_own_subject() {
        let single = Notification::PurchaseReceived {
            team: team(),
            items: vec![item("Coffee", 1, 1)],
        };
        let batch = Notification::PurchaseReceived {
            team: team(),
            items: vec![item("Coffee", 1, 1), item("Tea", 2, 2)],
        };
        assert_ne!(single.subject(), batch.subject());
    }

    #[test]
    fn disabled_outbox_swallows_notifications() {
        NotificationOutbox::disabled().emit(Notification::PurchaseConfirmed {
            team: team(),
            resource: "Coffee".to_string(),
            quantity: 1,
        });
    }

    #[test]
    fn emit_after_worker_is_gone_does_not_panic() {
        let (outbox, receiver) = NotificationOutbox::channel();
        drop(receiver);
        outbox.emit(Notification::PurchaseRejected {
            team: team(),
            resource: "Coffee".to_string(),
            quantity: 1,
        });
    }

    #[test]
    fn full_outbox_drops_instead_of_blocking() {
        let (outbox, mut receiver) = NotificationOutbox::with_capacity(1);
        for quantity in [1, 2] {
            outbox.emit(Notification::PurchaseConfirmed {
                team: team(),
                resource: "Coffee".to_string(),
                quantity,
            });
        }

        let queued = receiver.try_recv().unwrap();
        assert!(matches!(
            queued,
            Notification::PurchaseConfirmed { quantity: 1, .. }
        ));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn worker_delivers_more_than_its_concurrency_limit() {
        let notifier = Arc::new(FlakyNotifier {
            failures: Mutex::new(0),
            delivered: Mutex::new(Vec::new()),
        });
        let (outbox, receiver) = NotificationOutbox::channel();
        let handle = NotificationWorker::new(receiver, notifier.clone(), fast_policy(1)).spawn();

        for quantity in 0..(MAX_IN_FLIGHT as i64 * 2) {
            outbox.emit(Notification::PurchaseConfirmed {
                team: team(),
                resource: "Coffee".to_string(),
                quantity,
            });
        }
        drop(outbox);
        handle.await.unwrap();

        assert_eq!(notifier.delivered.lock().unwrap().len(), MAX_IN_FLIGHT * 2);
    }

    #[tokio::test]
    async fn worker_retries_until_delivered() {
        let notifier = Arc::new(FlakyNotifier {
            failures: Mutex::new(2),
            delivered: Mutex::new(Vec::new()),
        });
        let (outbox, receiver) = NotificationOutbox::channel();
        let worker = NotificationWorker::new(receiver, notifier.clone(), fast_policy(3));
        let handle = worker.spawn();

        outbox.emit(Notification::PurchaseConfirmed {
            team: team(),
            resource: "Coffee".to_string(),
            quantity: 1,
        });
        drop(outbox);
        handle.await.unwrap();

        assert_eq!(notifier.delivered.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn worker_gives_up_after_max_attempts() {
        let notifier = Arc::new(FlakyNotifier {
            failures: Mutex::new(5),
            delivered: Mutex::new(Vec::new()),
        });
        let delivered = deliver_with_retry(
            notifier.clone(),
            Notification::PurchaseRejected {
                team: team(),
                resource: "Coffee".to_string(),
                quantity: 1,
            },
            fast_policy(2),
        )
        .await;

        assert!(!delivered);
        assert_eq!(*notifier.failures.lock().unwrap(), 3);
        assert!(notifier.delivered.lock().unwrap().is_empty());
    }
}
