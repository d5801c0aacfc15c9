//! Five-field cron expressions: "MIN HOUR DOM MON DOW".
//! Supports `*`, `N`, `A-B`, `*/N`, `A-B/N` and comma lists.
//! Example: "0 9 * * 1" = every Monday at 9:00.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike};
use derive_more::Display;

#[derive(Debug, Display, PartialEq, Eq)]
#[display(fmt = "invalid cron expression '{}': {}", expression, reason)]
pub struct CronParseError {
    pub expression: String,
    pub reason: String,
}

impl std::error::Error for CronParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, CronParseError> {
        let fail = |reason: String| CronParseError {
            expression: expression.to_string(),
            reason,
        };

        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(fail(format!(
                "expected 5 fields (MIN HOUR DOM MON DOW), got {}",
                parts.len()
            )));
        }

        let minutes = parse_field(parts[0], 0, 59).map_err(&fail)?;
        let hours = parse_field(parts[1], 0, 23).map_err(&fail)?;
        let days_of_month = parse_field(parts[2], 1, 31).map_err(&fail)?;
        let months = parse_field(parts[3], 1, 12).map_err(&fail)?;
        // 7 is an alias for Sunday
        let mut days_of_week: Vec<u32> = parse_field(parts[4], 0, 7)
            .map_err(&fail)?
            .into_iter()
            .map(|d| d % 7)
            .collect();
        days_of_week.sort_unstable();
        days_of_week.dedup();

        Ok(Self {
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !parts[2].starts_with('*'),
            dow_restricted: !parts[4].starts_with('*'),
        })
    }

    fn matches_day(&self, date: NaiveDate) -> bool {
        if !self.months.contains(&date.month()) {
            return false;
        }
        let dom = self.days_of_month.contains(&date.day());
        let dow = self
            .days_of_week
            .contains(&date.weekday().num_days_from_sunday());

        // Classic cron: when both day fields are restricted, either may match.
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// First fire time strictly after `after`, evaluated in `after`'s zone.
    ///
    /// Local times skipped by a DST jump are not fired.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let local = after.naive_local();
        let start = local.with_second(0)?.with_nanosecond(0)? + Duration::minutes(1);

        let mut day = start.date();
        // Covers Feb 29 style schedules.
        for _ in 0..(366 * 8) {
            if self.matches_day(day) {
                for &hour in &self.hours {
                    for &minute in &self.minutes {
                        let candidate = day.and_time(NaiveTime::from_hms_opt(hour, minute, 0)?);
                        if candidate < start {
                            continue;
                        }
                        if let Some(at) = tz.from_local_datetime(&candidate).earliest() {
                            return Some(at);
                        }
                    }
                }
            }
            day = day.succ_opt()?;
        }
        None
    }
}

/// Parse a cron field into a sorted list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Result<Vec<u32>, String> {
    let mut values = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| format!("bad step '{step}'"))?;
                if step == 0 {
                    return Err("step must be positive".to_string());
                }
                (range, step)
            }
            None => (part, 1),
        };

        let (lo, hi) = if range == "*" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(a, min, max)?, parse_value(b, min, max)?)
        } else {
            let v = parse_value(range, min, max)?;
            // "5/15" means from 5 to the end in steps of 15
            if step > 1 { (v, max) } else { (v, v) }
        };

        if lo > hi {
            return Err(format!("empty range '{range}'"));
        }
        values.extend((lo..=hi).step_by(step as usize));
    }

    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn parse_value(raw: &str, min: u32, max: u32) -> Result<u32, String> {
    let v: u32 = raw.trim().parse().map_err(|_| format!("bad value '{raw}'"))?;
    if v < min || v > max {
        return Err(format!("value {v} outside {min}-{max}"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};
    use chrono_tz::America::Argentina::Buenos_Aires;

    #[test]
    fn weekly_monday_morning() {
        let schedule = CronSchedule::parse("0 9 * * 1").unwrap();
        // Sunday evening
        let after = Buenos_Aires.with_ymd_and_hms(2026, 10, 18, 20, 0, 0).unwrap();
        let next = schedule.next_after(&after).unwrap();

        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!((next.day(), next.hour(), next.minute()), (19, 9, 0));
    }

    #[test]
    fn fire_time_itself_moves_to_next_week() {
        let schedule = CronSchedule::parse("0 9 * * 1").unwrap();
        let after = Buenos_Aires.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let next = schedule.next_after(&after).unwrap();
        assert_eq!((next.month(), next.day()), (10, 26));
    }

    #[test]
    fn zone_offset_is_applied() {
        let schedule = CronSchedule::parse("0 9 * * 1").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 10, 19, 11, 0, 0).unwrap().with_timezone(&Buenos_Aires);
        let next = schedule.next_after(&after).unwrap().with_timezone(&Utc);
        // 09:00 in Buenos Aires is 12:00 UTC
        assert_eq!((next.day(), next.hour()), (19, 12));
    }

    #[test]
    fn steps_and_lists() {
        let after = Utc.with_ymd_and_hms(2026, 2, 22, 10, 2, 0).unwrap();
        let next = CronSchedule::parse("*/15 * * * *").unwrap().next_after(&after).unwrap();
        assert_eq!(next.minute(), 15);

        let next = CronSchedule::parse("0,30 8-10 * * *").unwrap().next_after(&after).unwrap();
        assert_eq!((next.hour(), next.minute()), (10, 30));
    }

    #[test]
    fn sunday_alias_and_day_fields() {
        let seven = CronSchedule::parse("0 0 * * 7").unwrap();
        let zero = CronSchedule::parse("0 0 * * 0").unwrap();
        assert_eq!(seven, zero);

        // 1st of the month or any Friday, whichever comes first
        let after = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let next = CronSchedule::parse("0 6 1 * 5").unwrap().next_after(&after).unwrap();
        assert_eq!((next.day(), next.weekday()), (23, Weekday::Fri));
    }

    #[test]
    fn stepped_day_field_still_combines_with_and() {
        // odd days of the month that are also Mondays
        let schedule = CronSchedule::parse("0 6 */2 * 1").unwrap();
        let after = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let next = schedule.next_after(&after).unwrap();
        assert_eq!((next.day(), next.weekday()), (19, Weekday::Mon));

        let after = Utc.with_ymd_and_hms(2026, 10, 19, 7, 0, 0).unwrap();
        let next = schedule.next_after(&after).unwrap();
        // skips Wed 21 (odd) and Mon 26 / Mon 2 Nov (even)
        assert_eq!((next.month(), next.day(), next.weekday()), (11, 9, Weekday::Mon));
    }

    #[test]
    fn invalid_expressions() {
        assert!(CronSchedule::parse("bad").is_err());
        assert!(CronSchedule::parse("60 * * * *").is_err());
        assert!(CronSchedule::parse("*/0 * * * *").is_err());
        assert!(CronSchedule::parse("0 9 * * 8").is_err());

        let err = CronSchedule::parse("0 9 * *").unwrap_err();
        assert!(err.to_string().contains("expected 5 fields"));
    }
}
