//! Compact localized duration text for notifications.
//!
//! Outage durations are reported in Ukrainian unit abbreviations
//! (д/г/хв/с). Leading zero units are omitted, inner zeros are kept, and
//! seconds are always present so "0с" is the shortest possible output.

use std::time::Duration;

/// Format an elapsed duration as compact text like "1д 3г 0хв 12с".
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}д"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}г"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{minutes}хв"));
    }
    parts.push(format!("{seconds}с"));

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_just_seconds() {
        assert_eq!(format_duration(Duration::ZERO), "0с");
    }

    #[test]
    fn seconds_only() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42с");
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(format_duration(Duration::from_secs(61)), "1хв 1с");
    }

    #[test]
    fn hours_minutes_seconds() {
        assert_eq!(format_duration(Duration::from_secs(3661)), "1г 1хв 1с");
    }

    #[test]
    fn no_day_component_when_days_zero() {
        let s = format_duration(Duration::from_secs(23 * 3600 + 59 * 60 + 59));
        assert_eq!(s, "23г 59хв 59с");
        assert!(!s.contains('д'));
    }

    #[test]
    fn full_day_span() {
        assert_eq!(format_duration(Duration::from_secs(90_061)), "1д 1г 1хв 1с");
    }

    #[test]
    fn inner_zero_units_are_kept() {
        assert_eq!(format_duration(Duration::from_secs(3601)), "1г 0хв 1с");
        assert_eq!(format_duration(Duration::from_secs(86_401)), "1д 0г 0хв 1с");
    }

    #[test]
    fn subsecond_precision_is_truncated() {
        assert_eq!(format_duration(Duration::from_millis(2999)), "2с");
    }
}
