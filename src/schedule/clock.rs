//! Caller-local time base.
//!
//! Every status the engine reports is relative to "now" on the caller's
//! wall clock, not the server's. The caller sends an instant (RFC 3339)
//! plus an IANA zone name; this module re-projects the instant through
//! that zone and hands the rest of the engine a plain local date-time and
//! calendar day. The server's own zone enters only as a fallback for an
//! unusable zone name.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use super::ScheduleError;

/// The caller's reference frame for one request: local wall-clock now,
/// and the calendar day administration logs are partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    pub now: NaiveDateTime,
    pub day: NaiveDate,
}

impl LocalClock {
    /// Build a clock from a caller-reported instant and IANA zone name.
    ///
    /// An instant that does not parse is a hard error. A zone that does
    /// not parse (the empty string included) degrades to the server's
    /// local zone: statuses stay well-defined, at worst shifted by the
    /// zone difference.
    pub fn resolve(client_date_time: &str, time_zone: &str) -> Result<LocalClock, ScheduleError> {
        let instant = DateTime::parse_from_rfc3339(client_date_time)
            .map_err(|_| ScheduleError::InvalidClientTime(client_date_time.to_string()))?;

        let now = match time_zone.parse::<Tz>() {
            Ok(tz) => instant.with_timezone(&tz).naive_local(),
            Err(_) => {
                tracing::warn!(time_zone, "Unknown IANA zone, using server-local time");
                instant.with_timezone(&Local).naive_local()
            }
        };

        Ok(LocalClock { now, day: now.date() })
    }

    /// Clock pinned to an explicit local date-time (tests, replays).
    pub fn fixed(now: NaiveDateTime) -> LocalClock {
        LocalClock { now, day: now.date() }
    }
}

/// Parse an `HH:MM` wall-clock time from a payload (seconds tolerated).
pub fn parse_wall_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ScheduleError::Validation(format!("not a valid HH:MM time: {value}")))
}

/// Parse a `YYYY-MM-DD` schedule date from a payload.
pub fn parse_schedule_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ScheduleError::Validation(format!("not a valid YYYY-MM-DD date: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reprojects_instant_through_caller_zone() {
        // 16:00 UTC on Christmas is 11:00 in New York (EST, UTC-5)
        let clock = LocalClock::resolve("2021-12-25T16:00:00.000Z", "America/New_York").unwrap();
        assert_eq!(clock.day, NaiveDate::from_ymd_opt(2021, 12, 25).unwrap());
        assert_eq!(clock.now.time(), NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }

    #[test]
    fn calendar_day_follows_caller_zone_west() {
        // 03:00 UTC Dec 26 is still Dec 25 in Chicago (CST, UTC-6)
        let clock = LocalClock::resolve("2021-12-26T03:00:00Z", "America/Chicago").unwrap();
        assert_eq!(clock.day, NaiveDate::from_ymd_opt(2021, 12, 25).unwrap());
        assert_eq!(clock.now.time(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn calendar_day_follows_caller_zone_east() {
        // 16:00 UTC Dec 25 is already Dec 26 in Tokyo (UTC+9)
        let clock = LocalClock::resolve("2021-12-25T16:00:00Z", "Asia/Tokyo").unwrap();
        assert_eq!(clock.day, NaiveDate::from_ymd_opt(2021, 12, 26).unwrap());
        assert_eq!(clock.now.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn offset_in_instant_is_respected() {
        let clock = LocalClock::resolve("2021-12-25T11:00:00-05:00", "America/New_York").unwrap();
        assert_eq!(clock.now.time(), NaiveTime::from_hms_opt(11, 0, 0).unwrap());
    }

    #[test]
    fn unknown_zone_degrades_to_server_local() {
        let clock = LocalClock::resolve("2021-12-25T16:00:00Z", "Mars/Olympus_Mons").unwrap();
        // Whatever the server zone is, the pair stays consistent
        assert_eq!(clock.day, clock.now.date());
    }

    #[test]
    fn empty_zone_degrades_to_server_local() {
        assert!(LocalClock::resolve("2021-12-25T16:00:00Z", "").is_ok());
    }

    #[test]
    fn malformed_instant_is_rejected() {
        let err = LocalClock::resolve("yesterday-ish", "America/New_York").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidClientTime(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn wall_time_parses_with_and_without_seconds() {
        assert_eq!(parse_wall_time("08:30").unwrap(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(parse_wall_time("08:30:15").unwrap(), NaiveTime::from_hms_opt(8, 30, 15).unwrap());
        assert!(parse_wall_time("8 am").is_err());
    }

    #[test]
    fn schedule_date_parses_iso_only() {
        assert_eq!(
            parse_schedule_date("2021-10-01").unwrap(),
            NaiveDate::from_ymd_opt(2021, 10, 1).unwrap()
        );
        assert!(parse_schedule_date("10/01/2021").is_err());
    }
}
