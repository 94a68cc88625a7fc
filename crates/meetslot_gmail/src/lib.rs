// --- File: crates/meetslot_gmail/src/lib.rs ---
pub mod message;
pub mod service;
#[cfg(test)]
mod service_test;

pub use service::{GmailError, GmailNotificationService, GMAIL_SEND_SCOPE};
