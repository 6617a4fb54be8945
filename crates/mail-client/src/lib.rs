//! Outbound email delivery.

mod client;
mod error;
mod notifier;
mod types;

pub use client::MailClient;
pub use error::MailError;
pub use notifier::{DisabledNotifier, Notifier};
pub use types::{Delivery, OutgoingEmail};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> MailClient {
        MailClient::new(
            mock_server.uri(),
            "portal@example.com",
            "app-password",
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn otp_email() -> OutgoingEmail {
        OutgoingEmail::new(
            "a@x.com",
            "Your OTP ✅",
            "<p>Hello A, your OTP is <b>123456</b></p>",
        )
    }

    #[tokio::test]
    async fn test_send_delivered() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(header(
                "authorization",
                "Basic cG9ydGFsQGV4YW1wbGUuY29tOmFwcC1wYXNzd29yZA==",
            ))
            .and(body_json(serde_json::json!({
                "from": "portal@example.com",
                "to": "a@x.com",
                "subject": "Your OTP ✅",
                "html": "<p>Hello A, your OTP is <b>123456</b></p>"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let delivery = client.send(&otp_email()).await;

        assert_eq!(delivery, Delivery::Delivered);
        assert!(delivery.is_delivered());
    }

    #[tokio::test]
    async fn test_explicit_from_address() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .and(body_json(serde_json::json!({
                "from": "noreply@example.com",
                "to": "a@x.com",
                "subject": "Your OTP ✅",
                "html": "<p>Hello A, your OTP is <b>123456</b></p>"
            })))
            .respond_with(ResponseTemplate::new(202))
            .mount(&mock_server)
            .await;

        let client = MailClient::new(
            format!("{}/", mock_server.uri()),
            "portal@example.com",
            "app-password",
            Some("noreply@example.com".into()),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.from_address(), "noreply@example.com");
        assert!(client.send(&otp_email()).await.is_delivered());
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid recipient"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);

        let result = client.deliver(&otp_email()).await;
        assert!(matches!(
            result,
            Err(MailError::Rejected { status: 400, ref message }) if message == "Invalid recipient"
        ));

        let delivery = client.send(&otp_email()).await;
        assert!(matches!(delivery, Delivery::Failed(ref reason) if reason.contains("Invalid recipient")));
    }

    #[tokio::test]
    async fn test_send_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let result = client.deliver(&otp_email()).await;

        assert!(matches!(result, Err(MailError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_failed_delivery() {
        let client = MailClient::new(
            "http://127.0.0.1:9",
            "portal@example.com",
            "app-password",
            None,
            Duration::from_secs(2),
        )
        .unwrap();

        let delivery = client.send(&otp_email()).await;
        assert!(!delivery.is_delivered());
    }

    #[tokio::test]
    async fn test_disabled_notifier() {
        let delivery = DisabledNotifier.send(&otp_email()).await;

        assert_eq!(
            delivery,
            Delivery::Failed("mail transport not configured".into())
        );
    }
}
