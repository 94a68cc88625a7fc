// --- File: crates/meetslot_scheduler/src/lib.rs ---
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod policy;

pub use logic::{compute_available_slots, group_by_day, BusyInterval, DaySlots, Slot};
pub use policy::{PolicyError, SchedulingPolicy};
