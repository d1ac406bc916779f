use cadence_core::error::CoreError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

const DISPLAY_FORMAT: &str = "%a %Y-%m-%d %H:%M %Z";

/// Parse an IANA timezone name
pub fn parse_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone.trim()).map_err(|_| {
        CoreError::InvalidInput(format!(
            "Invalid timezone: '{}'. Use IANA timezone names like 'America/New_York'",
            timezone
        ))
    })
}

/// Detect system timezone
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if !tz.is_empty() && parse_timezone(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if parse_timezone(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}

/// Render a stored UTC instant in the display zone
pub fn format_in_zone(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}
