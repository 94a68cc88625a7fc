// --- File: crates/meetslot_booking/src/logic.rs ---
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use meetslot_common::error::{
    config_error, conflict, external_service_error, validation_error, HttpStatusCode,
    MeetslotError,
};
use meetslot_common::services::{
    BoxedError, CalendarEvent, CalendarService, EmailMessage, NotificationService,
};
use meetslot_config::env_vars::SECRET_MARKER;
use meetslot_config::AppConfig;
use meetslot_scheduler::{
    compute_available_slots, group_by_day, BusyInterval, PolicyError, SchedulingPolicy, Slot,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

pub const DEFAULT_CALENDAR_ID: &str = "primary";
const NO_JOIN_LINK: &str = "(no video link was created)";
const MAX_NAME_LENGTH: usize = 200;

// --- Errors ---

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Requested time slot is no longer available")]
    Conflict,
    #[error("Calendar service error: {0}")]
    Upstream(String),
    #[error("Scheduling policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("{0} is disabled")]
    Unavailable(&'static str),
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Validation(_) => 400,
            BookingError::Conflict => 409,
            BookingError::Upstream(_) => 502,
            BookingError::Policy(_) => 500,
            BookingError::Unavailable(_) => 503,
        }
    }
}

impl From<BookingError> for MeetslotError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::Validation(msg) => validation_error(msg),
            BookingError::Conflict => conflict(message),
            BookingError::Upstream(msg) => external_service_error("Google Calendar", msg),
            BookingError::Policy(_) => config_error(message),
            BookingError::Unavailable(_) => MeetslotError::UnavailableError(message),
        }
    }
}

impl BookingError {
    /// The `(StatusCode, String)` pair handlers return.
    pub fn into_response_parts(self) -> (axum::http::StatusCode, String) {
        MeetslotError::from(self).into_response_parts()
    }
}

// --- Settings ---

/// Per-process booking settings derived from the config.
#[derive(Debug, Clone, Default)]
pub struct BookingSettings {
    /// Host calendar used when a request names none.
    pub default_calendar_id: String,
    /// Calendar the event is inserted into.
    pub event_calendar_id: String,
    pub sender_address: Option<String>,
    pub host_notice_email: Option<String>,
    pub fixed_attendee_email: Option<String>,
}

impl BookingSettings {
    pub fn from_config(config: &AppConfig, sender_address: Option<String>) -> Self {
        let google = config.google.clone().unwrap_or_default();
        let gmail = config.gmail.as_ref();
        Self {
            default_calendar_id: google
                .calendar_id
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            event_calendar_id: google
                .event_calendar_id
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            sender_address: resolved(gmail.and_then(|g| g.sender_email.clone()))
                .or(sender_address),
            host_notice_email: resolved(gmail.map(|g| g.host_notice_email.clone())),
            fixed_attendee_email: resolved(google.fixed_attendee_email),
        }
    }

    /// The requested calendar, or the default one when blank.
    pub fn calendar_or_default(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_calendar_id.clone())
    }
}

// An address left as the secret marker was never configured.
fn resolved(address: Option<String>) -> Option<String> {
    address.filter(|a| !a.trim().is_empty() && a != SECRET_MARKER)
}

// --- Request & Response DTOs ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Host calendar id, usually the host's email address.
    pub calendar: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotView {
    /// RFC 3339 start in the policy time zone.
    pub start: String,
    pub end: String,
    /// Local start time, e.g. "11:00".
    pub label: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DayAvailability {
    /// Local date, YYYY-MM-DD.
    pub date: String,
    /// Display label, e.g. "2025-05-05 (Mon)".
    pub label: String,
    pub slots: Vec<SlotView>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub calendar: String,
    pub time_zone: String,
    pub duration_minutes: i64,
    pub has_slots: bool,
    pub days: Vec<DayAvailability>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ConfirmQuery {
    /// RFC 3339 start time as listed by /availability.
    pub time: Option<String>,
    pub calendar: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConfirmResponse {
    pub calendar: String,
    pub start: String,
    pub end: String,
    /// e.g. "2025-05-05 (Mon) 11:00"
    pub label: String,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookMeetingRequest {
    pub name: String,
    pub email: String,
    pub time: String,
    pub calendar: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    pub event_id: Option<String>,
    pub start: String,
    pub end: String,
    pub join_link: Option<String>,
    /// False when the event exists but a confirmation email could not be sent.
    pub notifications_sent: bool,
    pub message: String,
}

// --- Availability ---

/// Fetches busy intervals once and runs the calculator on them.
pub async fn find_available_slots(
    calendar: &dyn CalendarService<Error = BoxedError>,
    calendar_id: &str,
    now: DateTime<Utc>,
    policy: &SchedulingPolicy,
) -> Result<Vec<Slot>, BookingError> {
    let fetch_end = now + policy.lead_time() + policy.horizon();
    let raw = calendar
        .get_busy_times(calendar_id, now, fetch_end)
        .await
        .map_err(|e| {
            error!("Error fetching free/busy for {}: {}", calendar_id, e);
            BookingError::Upstream(e.to_string())
        })?;

    let busy: Vec<BusyInterval> = raw
        .into_iter()
        .filter_map(|(start, end)| {
            let interval = BusyInterval::new(start, end);
            if interval.is_none() {
                warn!("Dropping empty busy interval {} - {}", start, end);
            }
            interval
        })
        .collect();

    Ok(compute_available_slots(now, &busy, policy)?)
}

pub fn availability_response(
    calendar_id: &str,
    policy: &SchedulingPolicy,
    slots: &[Slot],
) -> AvailabilityResponse {
    let days = group_by_day(slots)
        .into_iter()
        .map(|day| DayAvailability {
            date: day.date.format("%Y-%m-%d").to_string(),
            label: day.date.format("%Y-%m-%d (%a)").to_string(),
            slots: day.slots.iter().map(slot_view).collect(),
        })
        .collect::<Vec<_>>();

    AvailabilityResponse {
        calendar: calendar_id.to_string(),
        time_zone: policy.time_zone.name().to_string(),
        duration_minutes: policy.duration_minutes,
        has_slots: !days.is_empty(),
        days,
    }
}

fn slot_view(slot: &Slot) -> SlotView {
    SlotView {
        start: slot.start.to_rfc3339(),
        end: slot.end.to_rfc3339(),
        label: slot.start.format("%H:%M").to_string(),
    }
}

pub fn format_local(t: &DateTime<Tz>) -> String {
    t.format("%Y-%m-%d (%a) %H:%M").to_string()
}

// --- Validation ---

/// Parses an RFC 3339 timestamp from a query string or form.
///
/// Query decoding turns `+` into a space, so `...T11:00:00 09:00` is read as
/// `...T11:00:00+09:00`.
pub fn parse_requested_time(raw: &str) -> Result<DateTime<FixedOffset>, BookingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BookingError::Validation("No time was selected".to_string()));
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(&raw.replace(' ', "+")))
        .map_err(|e| BookingError::Validation(format!("Invalid time '{}': {}", raw, e)))
}

/// Checks that a requested start is still bookable under `policy`.
pub fn validate_requested_start(
    raw: &str,
    policy: &SchedulingPolicy,
    now: DateTime<Utc>,
) -> Result<DateTime<Tz>, BookingError> {
    policy.validate()?;
    let start = parse_requested_time(raw)?.with_timezone(&policy.time_zone);
    let start_utc = start.with_timezone(&Utc);

    if start_utc < now + policy.lead_time() {
        return Err(BookingError::Validation(format!(
            "Meetings must be booked at least {} minutes in advance",
            policy.lead_time_minutes
        )));
    }
    if start_utc >= now + policy.horizon() {
        return Err(BookingError::Validation(format!(
            "Meetings can only be booked up to {} days ahead",
            policy.horizon_days
        )));
    }
    if !policy.admits(start) {
        return Err(BookingError::Validation(
            "Requested time is outside business hours".to_string(),
        ));
    }
    Ok(start)
}

pub fn validate_contact(name: &str, email: &str) -> Result<(), BookingError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookingError::Validation("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH || name.chars().any(char::is_control) {
        return Err(BookingError::Validation("Name is not valid".to_string()));
    }
    if !is_plausible_email(email.trim()) {
        return Err(BookingError::Validation(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn confirm_selection(
    query: &ConfirmQuery,
    settings: &BookingSettings,
    policy: &SchedulingPolicy,
    now: DateTime<Utc>,
) -> Result<ConfirmResponse, BookingError> {
    let raw = query
        .time
        .as_deref()
        .ok_or_else(|| BookingError::Validation("No time was selected".to_string()))?;
    let start = validate_requested_start(raw, policy, now)?;
    let end = start + policy.duration();

    Ok(ConfirmResponse {
        calendar: settings.calendar_or_default(query.calendar.as_deref()),
        start: start.to_rfc3339(),
        end: end.to_rfc3339(),
        label: format_local(&start),
    })
}

// --- Messages ---

/// What the confirmation emails talk about.
#[derive(Debug, Clone)]
pub struct BookedMeeting {
    pub visitor_name: String,
    pub visitor_email: String,
    pub host: String,
    pub start: DateTime<Tz>,
    pub join_link: Option<String>,
}

impl BookedMeeting {
    fn join_link_text(&self) -> &str {
        self.join_link.as_deref().unwrap_or(NO_JOIN_LINK)
    }
}

pub fn attendee_confirmation(meeting: &BookedMeeting, from: &str) -> EmailMessage {
    let when = format_local(&meeting.start);
    EmailMessage {
        from: from.to_string(),
        to: meeting.visitor_email.clone(),
        subject: format!("Booking confirmed: meeting on {}", when),
        body: format!(
            "Dear {name},\n\n\
             Thank you for booking a meeting.\n\
             Your reservation is confirmed:\n\n\
             Host: {host}\n\
             Time: {when}\n\
             Join link: {link}\n\n\
             We look forward to speaking with you.",
            name = meeting.visitor_name,
            host = meeting.host,
            when = when,
            link = meeting.join_link_text(),
        ),
    }
}

pub fn internal_notice(meeting: &BookedMeeting, from: &str, to: &str) -> EmailMessage {
    let when = format_local(&meeting.start);
    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: format!("New booking: {} - {}", meeting.visitor_name, when),
        body: format!(
            "Hello,\n\n\
             A meeting with {name} has been booked.\n\n\
             Time: {when}\n\
             Name: {name}\n\
             Email: {email}\n\
             Host: {host}\n\
             Join link: {link}\n\n\
             A calendar invitation has been sent to all attendees.",
            name = meeting.visitor_name,
            email = meeting.visitor_email,
            host = meeting.host,
            when = when,
            link = meeting.join_link_text(),
        ),
    }
}

// --- Booking ---

/// Validates the request, creates the event and sends both notices.
///
/// Email failures after the event exists do not fail the booking; they show
/// up as `notifications_sent = false`.
pub async fn book_meeting(
    calendar: &dyn CalendarService<Error = BoxedError>,
    notifier: Option<&dyn NotificationService<Error = BoxedError>>,
    settings: &BookingSettings,
    policy: &SchedulingPolicy,
    request: &BookMeetingRequest,
    now: DateTime<Utc>,
) -> Result<BookingResponse, BookingError> {
    validate_contact(&request.name, &request.email)?;
    let start = validate_requested_start(&request.time, policy, now)?;
    let end = start + policy.duration();

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    let host = settings.calendar_or_default(request.calendar.as_deref());

    let mut attendees: Vec<String> = Vec::new();
    for address in [Some(&email), Some(&host), settings.fixed_attendee_email.as_ref()]
        .into_iter()
        .flatten()
    {
        if !attendees.iter().any(|a| a.eq_ignore_ascii_case(address)) {
            attendees.push(address.clone());
        }
    }

    let event = CalendarEvent {
        start_time: start.with_timezone(&Utc),
        end_time: end.with_timezone(&Utc),
        time_zone: policy.time_zone.name().to_string(),
        summary: format!("Meeting: {} (host: {})", name, host),
        description: Some(format!(
            "Meeting with {}.\nHost: {}\nThis event was booked automatically.",
            name, host
        )),
        attendees,
        with_video_conference: true,
    };

    let created = calendar
        .create_event(&settings.event_calendar_id, event)
        .await
        .map_err(|e| {
            if calendar.is_conflict(&e) {
                info!("Requested slot {} is already taken", start);
                BookingError::Conflict
            } else {
                error!("Failed to create event: {}", e);
                BookingError::Upstream(e.to_string())
            }
        })?;
    info!("Booked {} for {} with {}", format_local(&start), name, host);

    let meeting = BookedMeeting {
        visitor_name: name,
        visitor_email: email,
        host,
        start,
        join_link: created.join_link.clone(),
    };
    let notifications_sent = send_notifications(notifier, settings, &meeting).await;

    Ok(BookingResponse {
        success: true,
        event_id: created.event_id,
        start: start.to_rfc3339(),
        end: end.to_rfc3339(),
        join_link: created.join_link,
        notifications_sent,
        message: if notifications_sent {
            "Meeting booked. Confirmation emails have been sent.".to_string()
        } else {
            "Meeting booked. Calendar invitations were sent, but confirmation emails could not be delivered.".to_string()
        },
    })
}

async fn send_notifications(
    notifier: Option<&dyn NotificationService<Error = BoxedError>>,
    settings: &BookingSettings,
    meeting: &BookedMeeting,
) -> bool {
    let Some(notifier) = notifier else {
        warn!("Notification service disabled; no confirmation emails sent");
        return false;
    };
    let Some(from) = settings.sender_address.as_deref() else {
        warn!("No sender address configured; no confirmation emails sent");
        return false;
    };

    let mut all_sent = true;
    let mut messages = vec![attendee_confirmation(meeting, from)];
    match settings.host_notice_email.as_deref() {
        Some(to) => messages.push(internal_notice(meeting, from, to)),
        None => {
            warn!("No host notice address configured; skipping internal notice");
            all_sent = false;
        }
    }

    for message in messages {
        let to = message.to.clone();
        if let Err(e) = notifier.send_email(message).await {
            warn!("Failed to send email to {}: {}", to, e);
            all_sent = false;
        }
    }
    all_sent
}
