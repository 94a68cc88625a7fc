// --- File: crates/meetslot_booking/src/routes.rs ---

use crate::handlers::{
    book_meeting_handler, confirm_handler, get_availability_handler, health_handler, BookingState,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all booking routes.
///
/// The caller builds the state, so a disabled calendar integration still
/// yields a router whose booking endpoints answer 503.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/confirm", get(confirm_handler))
        .route("/book", post(book_meeting_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
