//! HTTP mail relay client.

use crate::error::MailError;
use crate::notifier::Notifier;
use crate::types::{Delivery, OutgoingEmail, SendRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Mail relay client.
///
/// The account password is stored using `SecretString` so it never shows up
/// in logs or debug output.
#[derive(Clone)]
pub struct MailClient {
    client: Client,
    api_url: String,
    username: String,
    password: SecretString,
    from: String,
}

impl MailClient {
    /// Create a new mail client.
    ///
    /// `from` defaults to the account username when not given.
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        from: Option<String>,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let client = Client::builder().timeout(timeout).build()?;
        let username = username.into();

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            from: from.unwrap_or_else(|| username.clone()),
            username,
            password: SecretString::new(password.into()),
        })
    }

    /// Sender address used for outgoing messages.
    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Hand a message to the relay.
    #[instrument(skip(self, email), fields(to = %email.to))]
    pub async fn deliver(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let request = SendRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(format!("{}/v1/send", self.api_url))
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = %status, "Mail relay refused credentials");
            return Err(MailError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %message, "Mail relay rejected message");
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Message accepted by relay");
        Ok(())
    }
}

#[async_trait]
impl Notifier for MailClient {
    async fn send(&self, email: &OutgoingEmail) -> Delivery {
        match self.deliver(email).await {
            Ok(()) => Delivery::Delivered,
            Err(e) => Delivery::Failed(e.to_string()),
        }
    }
}
