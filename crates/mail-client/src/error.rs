//! Mail client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail relay rejected message: {status} - {message}")]
    Rejected { status: u16, message: String },

    #[error("Authentication failed")]
    Unauthorized,
}
