//! Credential check against the users collection.

use super::Portal;
use crate::error::PortalError;
use record_store::{RecordStoreExt, UserRecord};
use session_store::Session;
use tracing::{info, instrument, warn};

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(UserRecord),
    /// Unknown email and wrong password are not distinguished.
    InvalidCredentials,
}

impl Portal {
    /// Log a session in as the first user whose email and password both
    /// match exactly.
    #[instrument(skip(self, session_id, password))]
    pub async fn login(
        &self,
        session_id: &str,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, PortalError> {
        let users: Vec<UserRecord> = self.records.load_all().await?;

        let Some(user) = users
            .into_iter()
            .find(|user| user.matches_credentials(email, password))
        else {
            warn!("Login rejected");
            return Ok(LoginOutcome::InvalidCredentials);
        };

        let authenticated = user.clone();
        self.sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| session.authenticate(authenticated)),
            )
            .await;

        info!(name = %user.name, "Login successful");
        Ok(LoginOutcome::Success(user))
    }
}
