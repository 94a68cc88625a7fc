// --- File: crates/meetslot_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, external_service_error, validation_error,
    HttpStatusCode, MeetslotError,
};

pub use http::client::{create_client, HTTP_CLIENT};

pub use features::{is_feature_enabled, is_gcal_enabled, is_gmail_enabled};
