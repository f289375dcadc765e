//! Candidate slot generation from weekly schedule rules.
//!
//! Rule windows are wall-clock times in the unit's timezone. Each window edge is
//! converted to UTC once and the window is tiled in absolute time, so a DST
//! transition inside a window changes how many slots fit rather than their width.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use shared_utils::datetime::{day_of_week, to_utc};

use crate::models::ScheduleRule;

/// Half-open `[start, end)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Touching intervals do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Slots of each matching rule's own `slot_min` width, ordered by start.
pub fn generate_slots(rules: &[ScheduleRule], date: NaiveDate, tz: Tz) -> Vec<Interval> {
    tile(rules, date, tz, |rule| rule.slot_min)
}

/// Candidates starting every `slot_min` of a rule but `width_minutes` wide, as
/// needed to book a service of that duration. Candidates running past the end
/// of the window are dropped.
pub fn generate_slots_for_width(
    rules: &[ScheduleRule],
    date: NaiveDate,
    tz: Tz,
    width_minutes: u32,
) -> Vec<Interval> {
    tile(rules, date, tz, |_| width_minutes)
}

fn tile<F>(rules: &[ScheduleRule], date: NaiveDate, tz: Tz, width_of: F) -> Vec<Interval>
where
    F: Fn(&ScheduleRule) -> u32,
{
    let weekday = day_of_week(date);
    let mut slots = Vec::new();

    for rule in rules.iter().filter(|r| r.day_of_week == weekday) {
        let width = width_of(rule);
        if rule.slot_min == 0 || width == 0 {
            continue;
        }
        let Some((open, close)) = rule.window() else {
            tracing::warn!("Skipping schedule rule {} with an invalid window", rule.id);
            continue;
        };

        let window_start = to_utc(date.and_time(open), tz);
        let window_end = to_utc(date.and_time(close), tz);
        let step = Duration::minutes(rule.slot_min as i64);
        let width = Duration::minutes(width as i64);

        let mut start = window_start;
        while start + width <= window_end {
            slots.push(Interval::new(start, start + width));
            start += step;
        }
    }

    slots.sort();
    slots.dedup();
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn rule(day_of_week: u8, start: &str, end: &str, slot_min: u32) -> ScheduleRule {
        ScheduleRule {
            id: Uuid::new_v4(),
            calendar_id: Uuid::new_v4(),
            day_of_week,
            start_time: start.to_string(),
            end_time: end.to_string(),
            slot_min,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // 2024-05-06 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn test_morning_rule_tiles_six_half_hour_slots() {
        let slots = generate_slots(&[rule(1, "09:00", "12:00", 30)], monday(), chrono_tz::UTC);

        assert_eq!(slots.len(), 6);
        assert!(slots.iter().all(|s| s.minutes() == 30));
        assert_eq!(slots[0].start, utc(2024, 5, 6, 9, 0));
        assert_eq!(slots[5].end, utc(2024, 5, 6, 12, 0));
    }

    #[test]
    fn test_twenty_minute_slots_in_one_hour() {
        let slots = generate_slots(&[rule(1, "09:00", "10:00", 20)], monday(), chrono_tz::UTC);

        assert_eq!(
            slots,
            vec![
                Interval::new(utc(2024, 5, 6, 9, 0), utc(2024, 5, 6, 9, 20)),
                Interval::new(utc(2024, 5, 6, 9, 20), utc(2024, 5, 6, 9, 40)),
                Interval::new(utc(2024, 5, 6, 9, 40), utc(2024, 5, 6, 10, 0)),
            ]
        );
    }

    #[test]
    fn test_trailing_partial_slot_is_dropped() {
        let slots = generate_slots(&[rule(1, "09:00", "10:10", 20)], monday(), chrono_tz::UTC);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2].end, utc(2024, 5, 6, 10, 0));
    }

    #[test]
    fn test_other_weekdays_yield_nothing() {
        assert!(generate_slots(&[rule(2, "09:00", "12:00", 30)], monday(), chrono_tz::UTC).is_empty());
    }

    #[test]
    fn test_local_window_is_converted_to_utc() {
        let slots = generate_slots(
            &[rule(1, "09:00", "10:00", 30)],
            monday(),
            chrono_tz::America::Sao_Paulo,
        );
        assert_eq!(slots[0].start, utc(2024, 5, 6, 12, 0));
        assert_eq!(slots[1].end, utc(2024, 5, 6, 13, 0));
    }

    #[test]
    fn test_service_width_candidates() {
        let slots = generate_slots_for_width(&[rule(1, "09:00", "10:00", 15)], monday(), chrono_tz::UTC, 45);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], Interval::new(utc(2024, 5, 6, 9, 0), utc(2024, 5, 6, 9, 45)));
        assert_eq!(slots[1], Interval::new(utc(2024, 5, 6, 9, 15), utc(2024, 5, 6, 10, 0)));
    }

    #[test]
    fn test_spring_forward_shortens_the_window() {
        // 2024-03-10 is a Sunday; New York skips 02:00-03:00 local.
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let slots = generate_slots(&[rule(0, "01:00", "04:00", 60)], date, chrono_tz::America::New_York);

        assert_eq!(
            slots,
            vec![
                Interval::new(utc(2024, 3, 10, 6, 0), utc(2024, 3, 10, 7, 0)),
                Interval::new(utc(2024, 3, 10, 7, 0), utc(2024, 3, 10, 8, 0)),
            ]
        );
    }

    #[test]
    fn test_overlapping_rules_do_not_duplicate_slots() {
        let rules = [rule(1, "09:00", "10:00", 30), rule(1, "09:30", "11:00", 30)];
        let slots = generate_slots(&rules, monday(), chrono_tz::UTC);

        assert_eq!(slots.len(), 4);
        assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = Interval::new(utc(2024, 5, 6, 9, 0), utc(2024, 5, 6, 10, 0));
        let b = Interval::new(utc(2024, 5, 6, 10, 0), utc(2024, 5, 6, 11, 0));
        let c = Interval::new(utc(2024, 5, 6, 9, 59), utc(2024, 5, 6, 10, 30));

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }
}
