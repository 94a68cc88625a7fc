// --- File: crates/meetslot_gcal/src/lib.rs ---
pub mod auth;
pub mod service;

pub use auth::{create_google_clients, GoogleClients, HubType, ServiceAccountCredentials};
pub use service::{GcalServiceError, GoogleCalendarService};
