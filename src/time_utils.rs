/// `HH:MM:SS` of a millisecond UTC timestamp.
pub fn format_hms_utc(timestamp_ms: u64) -> String {
    let secs_of_day = (timestamp_ms / 1000) % 86_400;
    format!("{:02}:{:02}:{:02}", secs_of_day / 3600, (secs_of_day % 3600) / 60, secs_of_day % 60)
}

/// Compact elapsed-time label.
///
/// - days present -> `1d 2h 3m`
/// - hours present -> `2h 3m`
/// - otherwise -> `3m`, or `45s` under a minute
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    let (days, hours, minutes) = (total / 86_400, (total % 86_400) / 3600, (total % 3600) / 60);
    if days > 0 {
        format!("{sign}{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{sign}{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{sign}{minutes}m")
    } else {
        format!("{sign}{total}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_wraps_at_midnight() {
        assert_eq!(format_hms_utc(0), "00:00:00");
        assert_eq!(format_hms_utc(86_400_000 + 3_723_000), "01:02:03");
    }

    #[test]
    fn duration_units() {
        assert_eq!(format_duration(93_780), "1d 2h 3m");
        assert_eq!(format_duration(7_380), "2h 3m");
        assert_eq!(format_duration(180), "3m");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(-180), "-3m");
    }
}
