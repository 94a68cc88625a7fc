//! Runtime feature checks.
//!
//! Integrations are switched on by a `use_*` flag in the config plus the
//! presence of their config section. Both must hold.

use meetslot_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar integration is enabled.
pub fn is_gcal_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gcal, config.google.as_ref())
}

/// Check if Gmail notifications are enabled.
///
/// Gmail reuses the Google credentials, so the Google section is required too.
pub fn is_gmail_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gmail, config.gmail.as_ref()) && config.google.is_some()
}
