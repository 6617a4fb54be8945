//! Registration, login and contact flows.
//!
//! The [`Portal`] owns no state of its own: records, sessions and the mail
//! transport are injected so each can be swapped for an in-memory fake.

mod contact;
mod login;
mod registration;

pub use contact::{localized_timestamp, ContactReceipt};
pub use login::LoginOutcome;
pub use registration::{RegistrationIssued, VerifyOutcome};

use crate::otp::{OtpGenerator, RandomOtp};
use mail_client::{Delivery, Notifier, OutgoingEmail};
use record_store::RecordStore;
use session_store::SessionBackend;
use std::sync::Arc;
use tracing::{error, info};

/// Entry point for every user-facing flow.
#[derive(Clone)]
pub struct Portal {
    records: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionBackend>,
    notifier: Arc<dyn Notifier>,
    otp: Arc<dyn OtpGenerator>,
}

impl Portal {
    /// Create a portal issuing random codes.
    pub fn new(
        records: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            records,
            sessions,
            notifier,
            otp: Arc::new(RandomOtp),
        }
    }

    /// Replace the code generator.
    pub fn with_otp_generator(mut self, otp: impl OtpGenerator + 'static) -> Self {
        self.otp = Arc::new(otp);
        self
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    pub fn sessions(&self) -> &Arc<dyn SessionBackend> {
        &self.sessions
    }

    /// Send an email and log the outcome. Never fails the caller.
    async fn dispatch(&self, email: OutgoingEmail) -> Delivery {
        let delivery = self.notifier.send(&email).await;

        match &delivery {
            Delivery::Delivered => info!(to = %email.to, "Email sent"),
            Delivery::Failed(reason) => error!(to = %email.to, reason = %reason, "Email failed"),
        }

        delivery
    }
}
