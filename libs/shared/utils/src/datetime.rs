//! Date and time helpers.
//!
//! Local wall-clock times are converted with [`to_utc`], which resolves DST the
//! same way everywhere in the workspace: a time that falls in a spring-forward gap
//! moves to the first valid instant after it, and a time repeated by a fall-back
//! transition takes the earlier instant.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;

use shared_config::DEFAULT_TIMEZONE;

use crate::validation::parse_time_of_day;

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Resolves an IANA zone name, falling back to the default zone.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown timezone '{}', using {}", name, DEFAULT_TIMEZONE);
        chrono_tz::America::Sao_Paulo
    })
}

pub fn to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Gaps are at most a few hours; probe forward minute by minute.
            let mut probe = local;
            for _ in 0..(24 * 60) {
                probe += Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
            Utc.from_utc_datetime(&local)
        }
    }
}

pub fn from_utc(instant: &DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    instant.with_timezone(&tz)
}

pub fn format_date(instant: &DateTime<Utc>, tz: Tz) -> String {
    format_with(instant, tz, DATE_FORMAT)
}

pub fn format_time(instant: &DateTime<Utc>, tz: Tz) -> String {
    format_with(instant, tz, TIME_FORMAT)
}

pub fn format_date_time(instant: &DateTime<Utc>, tz: Tz) -> String {
    format_with(instant, tz, DATE_TIME_FORMAT)
}

pub fn format_with(instant: &DateTime<Utc>, tz: Tz, pattern: &str) -> String {
    from_utc(instant, tz).format(pattern).to_string()
}

/// Parses RFC 3339 timestamps (`2024-05-06T09:00:00Z`, `...-03:00`).
pub fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn is_valid_date(raw: &str) -> bool {
    parse_iso(raw).is_some() || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn add_minutes(instant: &DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    *instant + Duration::minutes(minutes)
}

pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    to_utc(date.and_time(NaiveTime::default()), tz)
}

/// Last representable second of `date` in `tz`.
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next, tz) - Duration::seconds(1),
        None => start_of_day(date, tz) + Duration::hours(24) - Duration::seconds(1),
    }
}

/// Labels `HH:MM` every `step_minutes` from `start` (inclusive) to `end` (exclusive).
pub fn generate_time_slots(start: &str, end: &str, step_minutes: u32) -> Vec<String> {
    let (Some(start), Some(end)) = (parse_time_of_day(start), parse_time_of_day(end)) else {
        return Vec::new();
    };
    if step_minutes == 0 {
        return Vec::new();
    }

    let step = Duration::minutes(step_minutes as i64);
    let mut slots = Vec::new();
    let mut current = start;
    while current < end {
        slots.push(current.format(TIME_FORMAT).to_string());
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        current = next;
    }
    slots
}

/// Weekday (Monday to Friday) appointment inside business hours in `tz`.
pub fn is_valid_appointment_time(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    business_start: &str,
    business_end: &str,
    tz: Tz,
) -> bool {
    let (Some(open), Some(close)) = (parse_time_of_day(business_start), parse_time_of_day(business_end))
    else {
        return false;
    };

    let local_start = from_utc(start, tz);
    let local_end = from_utc(end, tz);

    let weekday = day_of_week(local_start.date_naive());
    if weekday == 0 || weekday == 6 {
        return false;
    }

    local_start.time() >= open && local_end.time() <= close && start < end
}

pub fn appointment_duration_minutes(start: &DateTime<Utc>, end: &DateTime<Utc>) -> i64 {
    (*end - *start).num_minutes()
}
