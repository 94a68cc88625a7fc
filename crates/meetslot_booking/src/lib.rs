// --- File: crates/meetslot_booking/src/lib.rs ---
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;
#[cfg(test)]
mod test_support;

pub use handlers::BookingState;
pub use routes::routes;
