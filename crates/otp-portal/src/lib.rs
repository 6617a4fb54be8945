//! OTP Portal - account registration confirmed by an emailed one-time code.
//!
//! The portal serves a handful of static pages and four form endpoints:
//! - Registration parks the submitted account in the visitor's session and
//!   emails a six-digit code
//! - Verification moves the account into the users document on a match
//! - Login checks credentials against the users document
//! - The contact form appends to its own document and sends a confirmation

pub mod api;
pub mod config;
pub mod error;
pub mod html;
pub mod otp;
pub mod workflow;

pub use config::Config;
pub use error::PortalError;
pub use otp::{FixedOtp, OtpGenerator, RandomOtp};
pub use workflow::{ContactReceipt, LoginOutcome, Portal, RegistrationIssued, VerifyOutcome};
