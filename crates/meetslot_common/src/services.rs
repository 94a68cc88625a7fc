// --- File: crates/meetslot_common/src/services.rs ---
//! Traits the booking flow uses to reach calendars, mail and credentials.
//!
//! The booking flow only talks to these traits. Google-backed implementations
//! live in `meetslot-gcal` and `meetslot-gmail`; tests plug in in-memory ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Object-safe async return type for the service traits.
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Type-erased error used once a service sits behind `Arc<dyn ...>`.
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl BoxedError {
    /// Wrap any concrete error.
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Calendar operations needed for booking: the free/busy source and the event sink.
pub trait CalendarService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Busy `(start, end)` pairs for `calendar_id` overlapping `[start_time, end_time)`.
    ///
    /// The result must be complete for the range; implementations fail
    /// rather than return a partial list.
    #[allow(clippy::type_complexity)]
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error>;

    /// Create a calendar event, optionally with a video conference attached.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Returns true if `err` means the requested window is already taken.
    fn is_conflict(&self, _err: &Self::Error) -> bool {
        false
    }
}

/// Outbound mail.
pub trait NotificationService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a plain-text email.
    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// Supplies access tokens for outbound API calls.
///
/// Scheduling code never sees credentials; only the integration crates hold a provider.
pub trait CredentialProvider: Send + Sync {
    /// Fetch a bearer token valid for the given OAuth scopes.
    fn access_token<'a>(&'a self, scopes: &'a [&'a str]) -> BoxFuture<'a, String, BoxedError>;

    /// The identity the tokens act as (e.g. the service account email).
    fn principal(&self) -> Option<String>;
}

/// Hands out the services enabled for this process.
pub trait ServiceFactory: Send + Sync {
    /// `None` when the calendar integration is disabled.
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>>;

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>>;

    /// The address notifications are sent from, if known.
    fn sender_address(&self) -> Option<String>;
}

/// A meeting to insert into a calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// IANA zone the event is displayed in.
    pub time_zone: String,
    /// Event title.
    pub summary: String,
    pub description: Option<String>,
    /// Email addresses invited to the event.
    pub attendees: Vec<String>,
    /// Ask the calendar to attach a video conference.
    pub with_video_conference: bool,
}

/// What the calendar reports back for a created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventResult {
    /// The ID of the event.
    pub event_id: Option<String>,
    /// Calendar status, e.g. "confirmed".
    pub status: String,
    /// Link to join the video conference, if one was created.
    pub join_link: Option<String>,
}

/// A plain-text email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Provider receipt for a sent email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// Provider message id.
    pub id: String,
    pub status: String,
}
