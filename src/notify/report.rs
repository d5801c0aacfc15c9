use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::model::{AttendanceRecord, Employee};

pub const SEGMENT_COUNT: usize = 3;
pub const BULLET: &str = " • ";
pub const MISSING_TIME: &str = "N/A";

// Fixed tables so the output never depends on the host locale.
const WEEKDAYS: [&str; 7] = ["Dom", "Lun", "Mar", "Mie", "Jue", "Vie", "Sab"];
const MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// The three text chunks of a weekly report, in record order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSegments([String; SEGMENT_COUNT]);

impl ReportSegments {
    pub fn build(records: &[AttendanceRecord]) -> Self {
        let [first, second, third] = split_segments(records);
        Self([
            format_segment(first),
            format_segment(second),
            format_segment(third),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> [String; SEGMENT_COUNT] {
        self.0
    }
}

/// Slices records into `ceil(n/3)`, `ceil(n/3)` and the remainder.
///
/// Bounds are clamped to `n`, so the tail (and for tiny inputs the middle) may
/// be empty. Concatenating the slices always yields `records` again.
pub fn split_segments<T>(records: &[T]) -> [&[T]; SEGMENT_COUNT] {
    let n = records.len();
    let size = n.div_ceil(SEGMENT_COUNT);
    let first_end = size.min(n);
    let second_end = (2 * size).min(n);
    [
        &records[..first_end],
        &records[first_end..second_end],
        &records[second_end..],
    ]
}

fn format_segment(records: &[AttendanceRecord]) -> String {
    records
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join(BULLET)
}

pub fn format_line(record: &AttendanceRecord) -> String {
    format!(
        "[{}] Entrada: {} / Salida: {}",
        format_date(record.date),
        format_time(record.first_time),
        format_time(record.last_time)
    )
}

/// `Lun 13 Oct` style label.
pub fn format_date(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    let month = MONTHS[date.month0() as usize];
    format!("{} {} {}", weekday, date.day(), month)
}

/// Keeps the `HH:MM` prefix of `HH:MM:SS`.
pub fn format_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => {
            let mut text = t.format("%H:%M:%S").to_string();
            text.truncate(5);
            text
        }
        None => MISSING_TIME.to_string(),
    }
}

/// Positional variables for the approved message template.
///
/// `"1"` is the employee header, `"2"`..`"4"` the report segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVariables(BTreeMap<String, String>);

impl TemplateVariables {
    pub fn new(header: String, segments: ReportSegments) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("1".to_string(), header);
        for (idx, segment) in segments.into_inner().into_iter().enumerate() {
            vars.insert((idx + 2).to_string(), segment);
        }
        Self(vars)
    }

    pub fn for_employee(employee: &Employee, records: &[AttendanceRecord]) -> Self {
        Self::new(employee.report_header(), ReportSegments::build(records))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, first: Option<(u32, u32, u32)>, last: Option<(u32, u32, u32)>) -> AttendanceRecord {
        let to_time = |(h, m, s): (u32, u32, u32)| NaiveTime::from_hms_opt(h, m, s).unwrap();
        AttendanceRecord {
            employee_id: "30111222".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            first_time: first.map(to_time),
            device_in: Some("Porton".into()),
            last_time: last.map(to_time),
            device_out: Some("Porton".into()),
        }
    }

    #[test]
    fn segment_sizes_follow_ceiling_split() {
        for n in 0..=20usize {
            let items: Vec<usize> = (0..n).collect();
            let [a, b, c] = split_segments(&items);
            let size = n.div_ceil(3);

            assert_eq!(a.len(), size.min(n), "n = {n}");
            assert_eq!(b.len(), size.min(n - a.len()), "n = {n}");
            assert_eq!(c.len(), n.saturating_sub(2 * size), "n = {n}");

            let joined: Vec<usize> = a.iter().chain(b).chain(c).copied().collect();
            assert_eq!(joined, items, "n = {n}");
        }
    }

    #[test]
    fn small_inputs_leave_trailing_segments_empty() {
        let one = [1];
        let [a, b, c] = split_segments(&one);
        assert_eq!((a.len(), b.len(), c.len()), (1, 0, 0));

        let four = [1, 2, 3, 4];
        let [a, b, c] = split_segments(&four);
        assert_eq!((a.len(), b.len(), c.len()), (2, 2, 0));

        let seven = [1, 2, 3, 4, 5, 6, 7];
        let [a, b, c] = split_segments(&seven);
        assert_eq!((a.len(), b.len(), c.len()), (3, 3, 1));
    }

    #[test]
    fn no_records_gives_three_empty_segments() {
        let segments = ReportSegments::build(&[]);
        assert!(segments.is_empty());
        assert_eq!(segments.as_slice(), ["", "", ""]);
    }

    #[test]
    fn missing_entry_time_renders_placeholder() {
        // 2026-10-13 is a Tuesday
        let line = format_line(&record(13, None, Some((14, 5, 30))));
        assert_eq!(line, "[Mar 13 Oct] Entrada: N/A / Salida: 14:05");
    }

    #[test]
    fn dates_use_fixed_spanish_abbreviations() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()), "Dom 18 Oct");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()), "Lun 5 Ene");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()), "Sab 1 Ago");
    }

    #[test]
    fn segments_join_lines_with_bullet() {
        let records = vec![
            record(12, Some((7, 2, 0)), Some((16, 1, 0))),
            record(13, Some((7, 15, 0)), None),
            record(14, Some((6, 59, 59)), Some((15, 30, 0))),
            record(15, Some((7, 0, 0)), Some((16, 0, 0))),
        ];
        let segments = ReportSegments::build(&records).into_inner();

        assert_eq!(
            segments[0],
            "[Lun 12 Oct] Entrada: 07:02 / Salida: 16:01 • [Mar 13 Oct] Entrada: 07:15 / Salida: N/A"
        );
        assert_eq!(
            segments[1],
            "[Mie 14 Oct] Entrada: 06:59 / Salida: 15:30 • [Jue 15 Oct] Entrada: 07:00 / Salida: 16:00"
        );
        assert_eq!(segments[2], "");
    }

    #[test]
    fn template_variables_are_numbered_from_header() {
        let employee = Employee {
            dni: "30111222".into(),
            nombre: "Juan".into(),
            apellido: "Perez".into(),
            telefono: "11 2345 6789".into(),
        };
        let vars = TemplateVariables::for_employee(&employee, &[record(16, Some((7, 0, 0)), None)]);

        assert_eq!(vars.get("1"), Some("Perez Juan - DNI: 30111222"));
        assert_eq!(vars.get("2"), Some("[Vie 16 Oct] Entrada: 07:00 / Salida: N/A"));
        assert_eq!(vars.get("3"), Some(""));
        assert_eq!(vars.get("4"), Some(""));

        let json: serde_json::Value = serde_json::from_str(&vars.to_json().unwrap()).unwrap();
        assert_eq!(json["1"], "Perez Juan - DNI: 30111222");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }
}
