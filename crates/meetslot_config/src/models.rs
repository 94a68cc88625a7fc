// --- File: crates/meetslot_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Scheduling Config ---
// Raw policy values as they appear in the config file.
// Validation happens when meetslot-scheduler turns this into a SchedulingPolicy.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// Length of one meeting in minutes.
    pub duration_minutes: i64,
    /// Granularity of candidate start times in minutes.
    pub step_minutes: i64,
    /// First bookable hour of a workday (local time).
    pub workday_start_hour: u32,
    /// Hour by which every meeting must have ended (local time).
    pub workday_end_hour: u32,
    /// Weekday names, e.g. ["Mon", "Tue"].
    pub workdays: Vec<String>,
    /// How many days ahead candidates are searched.
    pub horizon_days: i64,
    /// IANA time zone name, e.g. "Asia/Tokyo".
    pub time_zone: String,
    /// Minimum notice before the first bookable slot.
    #[serde(default = "default_lead_time_minutes")]
    pub lead_time_minutes: i64,
}

fn default_lead_time_minutes() -> i64 {
    60
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            step_minutes: 30,
            workday_start_hour: 10,
            workday_end_hour: 19,
            workdays: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            horizon_days: 7,
            time_zone: "Asia/Tokyo".to_string(),
            lead_time_minutes: default_lead_time_minutes(),
        }
    }
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GoogleConfig {
    pub key_path: Option<String>,    // Service account key file, may be "secret_from_env"
    pub calendar_id: Option<String>, // Host calendar queried for free/busy, defaults to "primary"
    /// Calendar the booked event is inserted into, defaults to "primary".
    pub event_calendar_id: Option<String>,
    /// User to impersonate via domain-wide delegation (needed to send Gmail as a user).
    pub delegated_user: Option<String>,
    /// Extra attendee added to every booked meeting.
    pub fixed_attendee_email: Option<String>,
}

// --- Gmail Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GmailConfig {
    /// Internal address that receives a notice for every booking.
    pub host_notice_email: String,
    /// From address; falls back to the service account principal.
    pub sender_email: Option<String>,
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
    pub file_prefix: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_gmail: bool,

    #[serde(default)]
    pub scheduling: SchedulingConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub google: Option<GoogleConfig>,
    #[serde(default)]
    pub gmail: Option<GmailConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}
