use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One collapsed day of access events for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: String,
    pub date: NaiveDate,
    pub first_time: Option<NaiveTime>,
    pub device_in: Option<String>,
    pub last_time: Option<NaiveTime>,
    pub device_out: Option<String>,
}

/// Date range queried from the attendance store.
///
/// `until` is exclusive, so the run day itself is never reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceWindow {
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub excluded_device_serial: String,
}

impl AttendanceWindow {
    pub fn ending_before(today: NaiveDate, days: u32, excluded_device_serial: &str) -> Self {
        Self {
            from: today - Duration::days(i64::from(days)),
            until: today,
            excluded_device_serial: excluded_device_serial.to_string(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.until
    }
}
