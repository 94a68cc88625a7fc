// File: crates/meetslot_booking/src/handlers.rs
use crate::logic::{
    availability_response, book_meeting, confirm_selection, find_available_slots,
    AvailabilityQuery, AvailabilityResponse, BookMeetingRequest, BookingError, BookingResponse,
    BookingSettings, ConfirmQuery, ConfirmResponse,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use meetslot_common::services::{BoxedError, CalendarService, NotificationService, ServiceFactory};
use meetslot_config::AppConfig;
use meetslot_scheduler::SchedulingPolicy;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

// Shared state for the booking handlers
#[derive(Clone)]
pub struct BookingState {
    pub policy: Arc<SchedulingPolicy>,
    pub settings: BookingSettings,
    pub calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    pub notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    /// Source of "now"; swapped out in tests.
    pub clock: fn() -> DateTime<Utc>,
}

impl BookingState {
    pub fn new(config: &AppConfig, policy: SchedulingPolicy, factory: &dyn ServiceFactory) -> Self {
        let calendar_service = factory.calendar_service();
        let notification_service = factory.notification_service();
        if calendar_service.is_none() {
            warn!("Calendar integration disabled; booking endpoints will return 503");
        }
        Self {
            policy: Arc::new(policy),
            settings: BookingSettings::from_config(config, factory.sender_address()),
            calendar_service,
            notification_service,
            clock: Utc::now,
        }
    }

    fn calendar(&self) -> Result<&dyn CalendarService<Error = BoxedError>, (StatusCode, String)> {
        self.calendar_service
            .as_deref()
            .ok_or_else(|| BookingError::Unavailable("Calendar integration").into_response_parts())
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub calendar_enabled: bool,
    pub notifications_enabled: bool,
}

/// Handler listing open slots grouped by local day.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Open slots grouped by day", body = AvailabilityResponse),
        (status = 502, description = "Free/busy lookup failed"),
        (status = 503, description = "Calendar integration disabled")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, String)> {
    let calendar = state.calendar()?;
    let calendar_id = state.settings.calendar_or_default(query.calendar.as_deref());

    let slots = find_available_slots(calendar, &calendar_id, (state.clock)(), &state.policy)
        .await
        .map_err(BookingError::into_response_parts)?;
    info!("{} open slots for {}", slots.len(), calendar_id);

    Ok(Json(availability_response(&calendar_id, &state.policy, &slots)))
}

/// Handler validating a chosen slot before contact details are collected.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/confirm",
    params(ConfirmQuery),
    responses(
        (status = 200, description = "Selection is bookable", body = ConfirmResponse),
        (status = 400, description = "Missing, malformed or unbookable time")
    ),
    tag = "Booking"
))]
pub async fn confirm_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<ConfirmResponse>, (StatusCode, String)> {
    confirm_selection(&query, &state.settings, &state.policy, (state.clock)())
        .map(Json)
        .map_err(BookingError::into_response_parts)
}

/// Handler creating the event and sending confirmations.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/book",
    request_body = BookMeetingRequest,
    responses(
        (status = 200, description = "Meeting booked", body = BookingResponse),
        (status = 400, description = "Invalid contact details or time"),
        (status = 409, description = "Slot already taken"),
        (status = 502, description = "Calendar service failed"),
        (status = 503, description = "Calendar integration disabled")
    ),
    tag = "Booking"
))]
pub async fn book_meeting_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<BookMeetingRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    let calendar = state.calendar()?;
    book_meeting(
        calendar,
        state.notification_service.as_deref(),
        &state.settings,
        &state.policy,
        &request,
        (state.clock)(),
    )
    .await
    .map(Json)
    .map_err(BookingError::into_response_parts)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Booking"
))]
pub async fn health_handler(State(state): State<Arc<BookingState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        calendar_enabled: state.calendar_service.is_some(),
        notifications_enabled: state.notification_service.is_some(),
    })
}
