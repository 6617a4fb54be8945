//! Notification sender abstraction.

use crate::types::{Delivery, OutgoingEmail};
use async_trait::async_trait;
use tracing::warn;

/// Best-effort email sender.
///
/// Implementations never fail the caller; the outcome is reported as a
/// [`Delivery`] for the caller to log or escalate.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Delivery;
}

/// Sender used when no mail credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        warn!(to = %email.to, subject = %email.subject, "Mail transport disabled, message dropped");
        Delivery::Failed("mail transport not configured".into())
    }
}
