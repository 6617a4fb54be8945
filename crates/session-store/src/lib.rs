//! Server-held visitor sessions.
//!
//! Sessions live in memory for the lifetime of the process and expire after
//! a configurable period without writes.

mod store;
mod types;

pub use store::{SessionBackend, SessionStore, SessionUpdate};
pub use types::*;
