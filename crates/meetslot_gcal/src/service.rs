// --- File: crates/meetslot_gcal/src/service.rs ---
//! Free/busy lookup and event insertion against the Google Calendar API.

use chrono::{DateTime, Utc};
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime, FreeBusyRequest, FreeBusyRequestItem, FreeBusyResponse,
};
use meetslot_common::services::{BoxFuture, CalendarEvent, CalendarEventResult, CalendarService};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::HubType;

const MEET_SOLUTION: &str = "hangoutsMeet";

#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Incomplete free/busy data: {0}")]
    IncompleteResponse(String),
    #[error("Invalid event window: {0}")]
    InvalidWindow(String),
    #[error("Booking conflict")]
    Conflict,
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Retrieves busy time periods for a calendar within a given time range.
    ///
    /// Fails instead of returning a partial list when Google reports an error
    /// for the calendar or leaves it out of the response.
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(start_time),
                time_max: Some(end_time),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_id.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy_response) = calendar_hub.freebusy().query(req).doit().await?;

            busy_periods_from_response(freebusy_response, &calendar_id)
        })
    }

    /// Creates an event, re-checking free/busy for its window first.
    ///
    /// Attendees receive Google's own invitations (`sendUpdates=all`). When a
    /// video conference is requested, the Meet link is returned in
    /// `join_link`.
    ///
    /// # Errors
    ///
    /// * `InvalidWindow` if the end is not after the start
    /// * `Conflict` if the window overlaps an existing busy period
    /// * `ApiError` if a Google call fails
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();
        let this = self;

        Box::pin(async move {
            if event.end_time <= event.start_time {
                return Err(GcalServiceError::InvalidWindow(
                    "End time must be after start time".to_string(),
                ));
            }

            let busy_times = this
                .get_busy_times(&calendar_id, event.start_time, event.end_time)
                .await?;
            if has_overlap(&busy_times, event.start_time, event.end_time) {
                return Err(GcalServiceError::Conflict);
            }

            let new_event = build_event(&event, &Uuid::new_v4().to_string());

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .conference_data_version(1)
                .send_updates("all")
                .doit()
                .await?;

            let join_link = join_link(&created_event);
            if event.with_video_conference && join_link.is_none() {
                warn!("Event {:?} was created without a video link", created_event.id);
            }
            info!("Created event {:?} in {}", created_event.id, calendar_id);

            Ok(CalendarEventResult {
                event_id: created_event.id,
                status: created_event.status.unwrap_or_else(|| "confirmed".to_string()),
                join_link,
            })
        })
    }

    fn is_conflict(&self, err: &Self::Error) -> bool {
        matches!(err, GcalServiceError::Conflict)
    }
}

/// Pulls the busy periods for `calendar_id` out of a free/busy response, sorted by start.
pub fn busy_periods_from_response(
    response: FreeBusyResponse,
    calendar_id: &str,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, GcalServiceError> {
    let calendar = response
        .calendars
        .and_then(|mut calendars| calendars.remove(calendar_id))
        .ok_or_else(|| {
            GcalServiceError::IncompleteResponse(format!("calendar {} missing", calendar_id))
        })?;

    if let Some(errors) = calendar.errors.filter(|e| !e.is_empty()) {
        let reasons: Vec<String> = errors
            .into_iter()
            .map(|e| e.reason.unwrap_or_else(|| "unknown".to_string()))
            .collect();
        return Err(GcalServiceError::IncompleteResponse(format!(
            "calendar {}: {}",
            calendar_id,
            reasons.join(", ")
        )));
    }

    let mut busy_periods = Vec::new();
    for period in calendar.busy.unwrap_or_default() {
        match (period.start, period.end) {
            (Some(start), Some(end)) if start < end => busy_periods.push((start, end)),
            _ => warn!("Skipping malformed busy period: {:?}", period),
        }
    }
    busy_periods.sort_by_key(|k| k.0);
    Ok(busy_periods)
}

fn has_overlap(
    busy_times: &[(DateTime<Utc>, DateTime<Utc>)],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    busy_times
        .iter()
        .any(|(busy_start, busy_end)| start < *busy_end && end > *busy_start)
}

/// Builds the Google event for an insert call.
pub fn build_event(event: &CalendarEvent, request_id: &str) -> Event {
    let attendees = event
        .attendees
        .iter()
        .map(|email| EventAttendee {
            email: Some(email.clone()),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let conference_data = event.with_video_conference.then(|| ConferenceData {
        create_request: Some(CreateConferenceRequest {
            request_id: Some(request_id.to_string()),
            conference_solution_key: Some(ConferenceSolutionKey {
                type_: Some(MEET_SOLUTION.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    });

    Event {
        summary: Some(event.summary.clone()),
        description: event.description.clone(),
        start: Some(EventDateTime {
            date_time: Some(event.start_time),
            time_zone: Some(event.time_zone.clone()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(event.end_time),
            time_zone: Some(event.time_zone.clone()),
            ..Default::default()
        }),
        attendees: (!attendees.is_empty()).then_some(attendees),
        conference_data,
        ..Default::default()
    }
}

/// The video link of a created event: `hangoutLink`, else the first video entry point.
pub fn join_link(event: &Event) -> Option<String> {
    event.hangout_link.clone().or_else(|| {
        event
            .conference_data
            .as_ref()?
            .entry_points
            .as_ref()?
            .iter()
            .find(|ep| ep.entry_point_type.as_deref() == Some("video"))
            .and_then(|ep| ep.uri.clone())
    })
}
