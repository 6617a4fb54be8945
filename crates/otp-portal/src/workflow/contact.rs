//! Contact form submissions.

use super::Portal;
use crate::error::PortalError;
use crate::html;
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Kolkata;
use mail_client::{Delivery, OutgoingEmail};
use record_store::{ContactSubmission, RecordStoreExt};
use tracing::{info, instrument};

/// A stored submission and how its confirmation email fared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReceipt {
    pub submission: ContactSubmission,
    pub delivery: Delivery,
}

/// Render a time the way the submission log records it: Indian Standard
/// Time, day first, 24-hour clock.
pub fn localized_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Kolkata)
        .format("%-d/%-m/%Y, %H:%M:%S")
        .to_string()
}

fn confirmation_email(submission: &ContactSubmission) -> OutgoingEmail {
    OutgoingEmail::new(
        submission.email.clone(),
        "Form Submission Received ✅",
        format!(
            "<p>Hello <b>{}</b>, we received your message at {}.</p>\n<p>Your message: {}</p>",
            html::escape(&submission.name),
            submission.timestamp,
            html::escape(&submission.message)
        ),
    )
}

impl Portal {
    /// Record a contact message and send a confirmation.
    ///
    /// The submission is stored before the email is attempted; a failed
    /// email does not undo it.
    #[instrument(skip(self, name, email, message), fields(email = %email))]
    pub async fn submit_contact(
        &self,
        name: String,
        email: String,
        message: String,
    ) -> Result<ContactReceipt, PortalError> {
        let submission = ContactSubmission {
            name,
            email,
            message,
            timestamp: localized_timestamp(Utc::now()),
        };

        let total = self.records.append_record(&submission).await?;
        info!(total_contacts = total, "Contact submission saved");

        let delivery = self.dispatch(confirmation_email(&submission)).await;
        Ok(ContactReceipt {
            submission,
            delivery,
        })
    }
}
