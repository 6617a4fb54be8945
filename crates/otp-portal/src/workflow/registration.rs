//! Email-verified registration.

use super::Portal;
use crate::error::PortalError;
use crate::html;
use crate::otp::parse_otp;
use mail_client::{Delivery, OutgoingEmail};
use record_store::{RecordStoreExt, UserRecord};
use session_store::{PendingCheck, PendingRegistration, Session};
use tracing::{info, instrument, warn};

/// A code was issued and stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationIssued {
    pub delivery: Delivery,
}

/// Result of submitting a verification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The code matched and the user was saved.
    Verified(UserRecord),
    /// The code did not match; the pending registration is kept.
    Rejected,
    /// The session holds no pending registration.
    SessionExpired,
}

fn otp_email(user: &UserRecord, otp: u32) -> OutgoingEmail {
    OutgoingEmail::new(
        user.email.clone(),
        "Your OTP ✅",
        format!(
            "<p>Hello {}, your OTP is <b>{}</b></p>",
            html::escape(&user.name),
            otp
        ),
    )
}

impl Portal {
    /// Start a registration: issue a code, park the user in the session and
    /// email the code.
    ///
    /// Any earlier pending registration in the session is replaced. Delivery
    /// failure does not stop the flow.
    #[instrument(skip(self, session_id, user), fields(email = %user.email))]
    pub async fn register(&self, session_id: &str, user: UserRecord) -> RegistrationIssued {
        let otp = self.otp.generate();

        let pending_user = user.clone();
        self.sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| session.set_pending(otp, pending_user)),
            )
            .await;

        info!("Verification code issued");

        let delivery = self.dispatch(otp_email(&user, otp)).await;
        RegistrationIssued { delivery }
    }

    /// Check a submitted code against the session's pending registration.
    ///
    /// Only the leading digits of the submission are read. On a match the
    /// session is destroyed and the user is appended to the users collection;
    /// concurrent submissions of the right code save the user once. A
    /// mismatch leaves the session untouched so the same code can be retried.
    #[instrument(skip(self, session_id, submitted))]
    pub async fn verify(
        &self,
        session_id: &str,
        submitted: &str,
    ) -> Result<VerifyOutcome, PortalError> {
        let Some(otp) = parse_otp(submitted) else {
            let pending = self
                .sessions
                .get(session_id)
                .await
                .is_some_and(|session| session.pending.is_some());
            return Ok(if pending {
                warn!("Verification code is not a number");
                VerifyOutcome::Rejected
            } else {
                warn!("Verification attempted without a pending registration");
                VerifyOutcome::SessionExpired
            });
        };

        let pending = match self.sessions.take_pending(session_id, otp).await {
            PendingCheck::Taken(pending) => pending,
            PendingCheck::Mismatch => {
                warn!("Verification code mismatch");
                return Ok(VerifyOutcome::Rejected);
            }
            PendingCheck::Missing => {
                warn!("Verification attempted without a pending registration");
                return Ok(VerifyOutcome::SessionExpired);
            }
        };

        let total = match self.records.append_record(&pending.user).await {
            Ok(total) => total,
            Err(e) => {
                // Put the registration back so the code can be resubmitted
                let PendingRegistration { otp, user } = pending;
                self.sessions
                    .update(
                        session_id,
                        Box::new(move |session: &mut Session| {
                            if session.pending.is_none() {
                                session.set_pending(otp, user);
                            }
                        }),
                    )
                    .await;
                return Err(e.into());
            }
        };

        info!(email = %pending.user.email, total_users = total, "Registration verified");
        Ok(VerifyOutcome::Verified(pending.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::{FixedOtp, RandomOtp, OTP_MAX, OTP_MIN};
    use crate::workflow::testing::{accepting_notifier, fixture, MockNotifier};
    use crate::workflow::LoginOutcome;
    use async_trait::async_trait;
    use record_store::{Collection, JsonFileStore, RecordStore, StoreError};
    use serde_json::Value;
    use session_store::{SessionBackend, SessionStore};
    use std::sync::Arc;
    use std::time::Duration;

    /// Reads succeed, every append fails.
    struct ReadOnlyStore;

    #[async_trait]
    impl RecordStore for ReadOnlyStore {
        async fn load(&self, _collection: Collection) -> Result<Vec<Value>, StoreError> {
            Ok(Vec::new())
        }

        async fn append(&self, _collection: Collection, _record: Value) -> Result<usize, StoreError> {
            Err(StoreError::Io {
                path: "users.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    fn user_a() -> UserRecord {
        UserRecord::new("A", "a@x.com", "p")
    }

    #[tokio::test]
    async fn test_register_then_verify_saves_user_once() {
        let f = fixture(accepting_notifier(), FixedOtp(123456));
        let sid = f.sessions.create().await;

        f.portal.register(&sid, user_a()).await;
        assert_eq!(f.sessions.get(&sid).await.unwrap().pending.unwrap().otp, 123456);

        let outcome = f.portal.verify(&sid, "123456").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Verified(user_a()));

        let users: Vec<UserRecord> = f.records.load_all().await.unwrap();
        assert_eq!(users, vec![user_a()]);

        // Session was destroyed, so a repeat is reported as expired
        assert!(f.sessions.get(&sid).await.is_none());
        let outcome = f.portal.verify(&sid, "123456").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::SessionExpired);

        let users: Vec<UserRecord> = f.records.load_all().await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_pending_state() {
        let f = fixture(accepting_notifier(), FixedOtp(123456));
        let sid = f.sessions.create().await;

        f.portal.register(&sid, user_a()).await;
        let before = f.sessions.get(&sid).await.unwrap();

        for wrong in ["654321", "", "abc", "1234567"] {
            let outcome = f.portal.verify(&sid, wrong).await.unwrap();
            assert_eq!(outcome, VerifyOutcome::Rejected);
        }

        assert_eq!(f.sessions.get(&sid).await.unwrap(), before);
        let users: Vec<UserRecord> = f.records.load_all().await.unwrap();
        assert!(users.is_empty());

        // The issued code still works after failures
        let outcome = f.portal.verify(&sid, " 123456 ").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Verified(user_a()));
    }

    #[tokio::test]
    async fn test_verify_without_registration_is_session_expired() {
        let f = fixture(accepting_notifier(), FixedOtp(123456));

        let sid = f.sessions.create().await;
        let outcome = f.portal.verify(&sid, "123456").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::SessionExpired);

        let outcome = f.portal.verify("unknown-session", "123456").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::SessionExpired);
    }

    #[tokio::test]
    async fn test_second_registration_overwrites_first() {
        let f = fixture(accepting_notifier(), RandomOtp);
        let sid = f.sessions.create().await;

        f.portal.register(&sid, user_a()).await;
        let first = f.sessions.get(&sid).await.unwrap().pending.unwrap();

        let user_b = UserRecord::new("B", "b@x.com", "q");
        f.portal.register(&sid, user_b.clone()).await;
        let second = f.sessions.get(&sid).await.unwrap().pending.unwrap();

        assert_eq!(second.user, user_b);
        assert!((OTP_MIN..=OTP_MAX).contains(&second.otp));

        let outcome = f.portal.verify(&sid, &second.otp.to_string()).await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Verified(user_b));

        let users: Vec<UserRecord> = f.records.load_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_ne!(users[0], first.user);
    }

    #[tokio::test]
    async fn test_register_emails_code_to_user() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|email| {
                email.to == "a@x.com"
                    && email.subject == "Your OTP ✅"
                    && email.html == "<p>Hello A, your OTP is <b>123456</b></p>"
            })
            .times(1)
            .returning(|_| Delivery::Delivered);

        let f = fixture(notifier, FixedOtp(123456));
        let sid = f.sessions.create().await;

        let issued = f.portal.register(&sid, user_a()).await;
        assert_eq!(issued.delivery, Delivery::Delivered);
    }

    #[tokio::test]
    async fn test_delivery_failure_still_issues_code() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .times(1)
            .returning(|_| Delivery::Failed("relay down".into()));

        let f = fixture(notifier, FixedOtp(123456));
        let sid = f.sessions.create().await;

        let issued = f.portal.register(&sid, user_a()).await;
        assert_eq!(issued.delivery, Delivery::Failed("relay down".into()));

        let outcome = f.portal.verify(&sid, "123456").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::Verified(user_a()));
    }

    #[tokio::test]
    async fn test_verify_clears_authenticated_state_too() {
        let f = fixture(accepting_notifier(), FixedOtp(123456));
        let sid = f.sessions.create().await;

        let mut session = f.sessions.get(&sid).await.unwrap();
        session.authenticate(UserRecord::new("Z", "z@x.com", "z"));
        f.sessions.put(&sid, session).await;

        f.portal.register(&sid, user_a()).await;
        assert!(f.sessions.get(&sid).await.unwrap().authenticated.is_some());

        f.portal.verify(&sid, "123456").await.unwrap();
        assert!(f.sessions.get(&sid).await.is_none());
    }

    #[tokio::test]
    async fn test_verify_reads_leading_digits() {
        let f = fixture(accepting_notifier(), FixedOtp(123456));

        for submitted in ["123456abc", "123456.0", " +123456", "0123456"] {
            let sid = f.sessions.create().await;
            f.portal.register(&sid, user_a()).await;

            let outcome = f.portal.verify(&sid, submitted).await.unwrap();
            assert_eq!(outcome, VerifyOutcome::Verified(user_a()), "{:?}", submitted);
        }

        let users: Vec<UserRecord> = f.records.load_all().await.unwrap();
        assert_eq!(users.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_correct_codes_save_user_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let records = Arc::new(JsonFileStore::in_dir(dir.path()));
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        let portal = Portal::new(
            records.clone(),
            sessions.clone(),
            Arc::new(accepting_notifier()),
        )
        .with_otp_generator(FixedOtp(123456));

        for round in 1..=25 {
            let sid = sessions.create().await;
            portal.register(&sid, user_a()).await;

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let portal = portal.clone();
                    let sid = sid.clone();
                    tokio::spawn(async move { portal.verify(&sid, "123456").await.unwrap() })
                })
                .collect();

            let mut verified = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    VerifyOutcome::Verified(_) => verified += 1,
                    other => assert_eq!(other, VerifyOutcome::SessionExpired),
                }
            }
            assert_eq!(verified, 1);

            let users: Vec<UserRecord> = records.load_all().await.unwrap();
            assert_eq!(users.len(), round);
        }
    }

    #[tokio::test]
    async fn test_failed_save_keeps_registration_pending() {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        let portal = Portal::new(
            Arc::new(ReadOnlyStore),
            sessions.clone(),
            Arc::new(accepting_notifier()),
        )
        .with_otp_generator(FixedOtp(123456));

        let sid = sessions.create().await;
        portal.register(&sid, user_a()).await;

        let result = portal.verify(&sid, "123456").await;
        assert!(matches!(result, Err(PortalError::Storage(_))));

        let pending = sessions.get(&sid).await.unwrap().pending.unwrap();
        assert_eq!(pending.otp, 123456);
        assert_eq!(pending.user, user_a());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_login_during_registration_keeps_pending_code() {
        let f = fixture(accepting_notifier(), FixedOtp(123456));
        f.records
            .append_record(&UserRecord::new("Z", "z@x.com", "z"))
            .await
            .unwrap();

        for _ in 0..25 {
            let sid = f.sessions.create().await;

            let register = {
                let portal = f.portal.clone();
                let sid = sid.clone();
                tokio::spawn(async move { portal.register(&sid, user_a()).await })
            };
            let login = {
                let portal = f.portal.clone();
                let sid = sid.clone();
                tokio::spawn(async move { portal.login(&sid, "z@x.com", "z").await.unwrap() })
            };
            register.await.unwrap();
            assert!(matches!(login.await.unwrap(), LoginOutcome::Success(_)));

            let session = f.sessions.get(&sid).await.unwrap();
            assert_eq!(session.pending.unwrap().otp, 123456);
            assert_eq!(session.authenticated.unwrap().name, "Z");
        }
    }
}
