// File: crates/meetslot_booking/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::HealthResponse;
use crate::logic::{
    AvailabilityResponse, BookMeetingRequest, BookingResponse, ConfirmResponse, DayAvailability,
    SlotView,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::confirm_handler,
        crate::handlers::book_meeting_handler,
        crate::handlers::health_handler
    ),
    components(
        schemas(
            AvailabilityResponse,
            DayAvailability,
            SlotView,
            ConfirmResponse,
            BookMeetingRequest,
            BookingResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "Booking", description = "Meeting slot search and booking API")
    ),
    servers(
        (url = "/api", description = "Meetslot API server")
    )
)]
pub struct BookingApiDoc;
