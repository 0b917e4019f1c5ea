use jiff::Timestamp;
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Human-friendly age of `ts` relative to now, in the local time zone.
pub fn format_relative(ts: Timestamp) -> String {
    format_relative_at(ts, Timestamp::now(), &TimeZone::system())
}

pub fn format_relative_at(ts: Timestamp, now: Timestamp, tz: &TimeZone) -> String {
    let diff = now.as_second() - ts.as_second();
    if diff < 0 {
        return format_absolute(ts, now, tz);
    }

    match diff {
        d if d < MINUTE => "just now".to_string(),
        d if d < HOUR => {
            let mins = d / MINUTE;
            format!("{mins} minute{} ago", if mins == 1 { "" } else { "s" })
        }
        d if d < DAY => {
            let hours = d / HOUR;
            format!("{hours} hour{} ago", if hours == 1 { "" } else { "s" })
        }
        d if d < 2 * DAY => "yesterday".to_string(),
        d if d < 7 * DAY => format!("{} days ago", d / DAY),
        _ => format_absolute(ts, now, tz),
    }
}

fn format_absolute(ts: Timestamp, now: Timestamp, tz: &TimeZone) -> String {
    let date = ts.to_zoned(tz.clone());
    let today = now.to_zoned(tz.clone());
    if date.year() == today.year() {
        date.strftime("%b %-d").to_string()
    } else {
        date.strftime("%b %-d, %Y").to_string()
    }
}

/// Parses an RFC 3339 timestamp, a local date-time or a plain `YYYY-MM-DD`
/// date (taken as UTC midnight).
pub fn parse_date(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(ts) = input.parse::<Timestamp>() {
        return Some(ts);
    }
    if input.contains(['T', 't', ' ']) {
        let dt = input.parse::<DateTime>().ok()?;
        return dt.to_zoned(TimeZone::system()).ok().map(|z| z.timestamp());
    }
    let date = input.parse::<Date>().ok()?;
    date.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Timestamp {
        s.parse().expect("timestamp")
    }

    fn relative(s: &str) -> String {
        format_relative_at(at(s), at("2024-06-15T12:00:00Z"), &TimeZone::UTC)
    }

    #[test]
    fn recent_times() {
        assert_eq!(relative("2024-06-15T11:59:30Z"), "just now");
        assert_eq!(relative("2024-06-15T11:59:00Z"), "1 minute ago");
        assert_eq!(relative("2024-06-15T11:30:00Z"), "30 minutes ago");
        assert_eq!(relative("2024-06-15T11:00:00Z"), "1 hour ago");
        assert_eq!(relative("2024-06-15T10:00:00Z"), "2 hours ago");
    }

    #[test]
    fn days() {
        assert_eq!(relative("2024-06-14T12:00:00Z"), "yesterday");
        assert_eq!(relative("2024-06-12T12:00:00Z"), "3 days ago");
        assert_eq!(relative("2024-06-10T12:00:00Z"), "5 days ago");
    }

    #[test]
    fn older_dates_are_absolute() {
        assert_eq!(relative("2024-05-01T12:00:00Z"), "May 1");
        assert_eq!(relative("2023-01-15T12:00:00Z"), "Jan 15, 2023");
        assert_eq!(relative("2024-07-01T12:00:00Z"), "Jul 1");
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2024-06-15T12:00:00Z"),
            Some(at("2024-06-15T12:00:00Z"))
        );
        assert_eq!(parse_date("2024-06-15"), Some(at("2024-06-15T00:00:00Z")));
        assert_eq!(parse_date("invalid"), None);
        assert_eq!(parse_date(""), None);
    }
}
