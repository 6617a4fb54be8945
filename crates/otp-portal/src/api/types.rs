//! API request and response types.

use record_store::UserRecord;
use serde::{Deserialize, Deserializer, Serialize};

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn into_user(self) -> UserRecord {
        UserRecord::new(self.name, self.email, self.password)
    }
}

/// Verification code form.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    /// Submitted code as text
    #[serde(deserialize_with = "string_or_number")]
    pub otp: String,
}

/// Accept `"123456"` as well as a bare JSON integer or float.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Text(s) => s,
    })
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Contact form.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub users: usize,
    pub contacts: usize,
    pub active_sessions: usize,
}
