// --- File: crates/meetslot_common/src/http/mod.rs ---
pub mod client;
