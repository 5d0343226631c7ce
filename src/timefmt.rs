//! Sheet timestamps.
//!
//! The server stamps rows with `MM-DD-YYYY HH:mm` in UTC. That text carries no
//! offset, so rows keep the parsed UTC instant and only the displayed string
//! is converted. RFC 3339 timestamps are accepted as well.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::{Error, Result};

/// Wire and display format for sheet timestamps.
pub const DT_FORMAT: &str = "%m-%d-%Y %H:%M";

/// Parse a timestamp sent by the server.
pub fn parse_wire(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, DT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::Timestamp {
            value: value.to_string(),
        })
}

/// Format an instant the way the server sends it (UTC, no offset).
pub fn format_wire(ts: &DateTime<Utc>) -> String {
    ts.format(DT_FORMAT).to_string()
}

pub fn format_in<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format(DT_FORMAT).to_string()
}

/// Time zone used when showing timestamps to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    /// The viewer's local zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    pub fn format(&self, ts: &DateTime<Utc>) -> String {
        match self {
            DisplayZone::Local => format_in(ts, &Local),
            DisplayZone::Fixed(offset) => format_in(ts, offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_wire_format_is_utc() {
        let ts = parse_wire("01-02-2024 10:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-02T10:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_keeps_instant() {
        let ts = parse_wire("2024-01-02T12:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(format_wire(&ts), "01-02-2024 10:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_wire("yesterday"), Err(Error::Timestamp { .. })));
        assert!(parse_wire("2024-01-02 10:00").is_err());
    }

    #[test]
    fn test_display_in_fixed_offset() {
        let ts = parse_wire("01-02-2024 23:30").unwrap();
        let plus_two = DisplayZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(plus_two.format(&ts), "01-03-2024 01:30");
        let minus_five = DisplayZone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(minus_five.format(&ts), "01-02-2024 18:30");
    }

    #[test]
    fn test_display_output_is_lossy_without_marker() {
        // Reading the displayed text back as UTC shifts it by the offset again.
        let zone = DisplayZone::Fixed(FixedOffset::east_opt(3600).unwrap());
        let ts = parse_wire("06-01-2024 08:00").unwrap();
        let shown = zone.format(&ts);
        let reread = parse_wire(&shown).unwrap();
        assert_ne!(reread, ts);
        assert_eq!(DisplayZone::utc().format(&ts), format_wire(&ts));
    }
}
