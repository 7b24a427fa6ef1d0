use crate::domain::sales::DateValue;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

// Day zero of the serial numbering used by common spreadsheet tools.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

// Roughly +/- 8000 years; keeps Duration::days well inside its range.
const MAX_SERIAL_DAYS: f64 = 3_000_000.0;

const GENERIC_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

const GENERIC_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];
const GENERIC_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Resolves the weekday of a sale date. `None` is the "unknown" outcome:
/// callers exclude such records instead of failing.
pub fn weekday_of(value: &DateValue) -> Option<Weekday> {
    resolve_date(value).map(|d| d.weekday())
}

pub fn resolve_date(value: &DateValue) -> Option<NaiveDate> {
    match value {
        DateValue::Date(d) => Some(*d),
        DateValue::Serial(n) => from_serial(*n),
        DateValue::Text(s) => from_text(s),
    }
}

/// Fractional parts (time of day) are dropped.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

fn from_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if is_numeric_text(s) {
        return s.parse::<f64>().ok().and_then(from_serial);
    }

    if let Some(parts) = strict_dmy_parts(s) {
        // A dd/mm/yyyy shape that is not a real calendar date stays unknown
        // rather than falling through to looser formats.
        let (day, month, year) = parts;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    generic_parse(s)
}

fn is_numeric_text(s: &str) -> bool {
    let mut dots = 0;
    for c in s.chars() {
        match c {
            '0'..='9' => {}
            '.' => dots += 1,
            _ => return false,
        }
    }
    dots <= 1 && s.chars().any(|c| c.is_ascii_digit())
}

fn strict_dmy_parts(s: &str) -> Option<(u32, u32, i32)> {
    let mut it = s.split('/');
    let (d, m, y) = (it.next()?, it.next()?, it.next()?);
    if it.next().is_some() {
        return None;
    }

    let digits = |p: &str, lens: &[usize]| {
        lens.contains(&p.len()) && p.chars().all(|c| c.is_ascii_digit())
    };
    if !(digits(d, &[1, 2]) && digits(m, &[1, 2]) && digits(y, &[4])) {
        return None;
    }

    Some((d.parse().ok()?, m.parse().ok()?, y.parse().ok()?))
}

// `%Y` accepts any digit count, so "29/01/24" would otherwise parse as year 29.
fn generic_parse(s: &str) -> Option<NaiveDate> {
    let dates = GENERIC_DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok());
    let datetimes = GENERIC_DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date());
    let rfc3339 = DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive());

    dates
        .chain(datetimes)
        .chain(rfc3339)
        .find(|d| GENERIC_YEARS.contains(&d.year()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Weekday> {
        weekday_of(&DateValue::Text(s.to_string()))
    }

    fn serial(n: f64) -> Option<Weekday> {
        weekday_of(&DateValue::Serial(n))
    }

    #[test]
    fn native_dates_pass_through() {
        // 2024-01-29 is a Monday.
        let d = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();
        assert_eq!(weekday_of(&DateValue::Date(d)), Some(Weekday::Mon));
    }

    #[test]
    fn serials_count_from_spreadsheet_epoch() {
        assert_eq!(from_serial(0.0), NaiveDate::from_ymd_opt(1899, 12, 30));
        assert_eq!(from_serial(1.0), NaiveDate::from_ymd_opt(1899, 12, 31));
        assert_eq!(from_serial(45292.0), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(serial(45292.0), Some(Weekday::Mon));
        assert_eq!(serial(45320.0), Some(Weekday::Mon));
        assert_eq!(serial(45321.0), Some(Weekday::Tue));
        assert_eq!(serial(45326.0), Some(Weekday::Sun));
    }

    #[test]
    fn serial_time_of_day_is_ignored() {
        assert_eq!(serial(45320.99), Some(Weekday::Mon));
        assert_eq!(serial(45320.01), Some(Weekday::Mon));
    }

    #[test]
    fn non_finite_or_huge_serials_are_unknown() {
        assert_eq!(serial(f64::NAN), None);
        assert_eq!(serial(f64::INFINITY), None);
        assert_eq!(serial(1e300), None);
        assert_eq!(serial(-1e12), None);
    }

    #[test]
    fn strict_day_month_year_text() {
        assert_eq!(text("29/01/2024"), Some(Weekday::Mon));
        assert_eq!(text("29/1/2024"), Some(Weekday::Mon));
        // Day first, never month first: 1 Feb 2024 is a Thursday.
        assert_eq!(text("01/02/2024"), Some(Weekday::Thu));
        assert_eq!(text(" 03/02/2024 "), Some(Weekday::Sat));
    }

    #[test]
    fn impossible_calendar_dates_are_unknown() {
        assert_eq!(text("31/02/2024"), None);
        assert_eq!(text("00/01/2024"), None);
        assert_eq!(text("12/13/2024"), None);
        assert_eq!(text("29/02/2023"), None);
        assert_eq!(text("29/02/2024"), Some(Weekday::Thu));
    }

    #[test]
    fn numeric_text_is_a_serial() {
        assert_eq!(text("45320"), Some(Weekday::Mon));
        assert_eq!(text("45320.5"), Some(Weekday::Mon));
        assert_eq!(text("1.2.3"), None);
    }

    #[test]
    fn generic_formats_fall_back() {
        assert_eq!(text("2024-01-29"), Some(Weekday::Mon));
        assert_eq!(text("2024/01/29"), Some(Weekday::Mon));
        assert_eq!(text("29-01-2024"), Some(Weekday::Mon));
        assert_eq!(text("29.01.2024"), Some(Weekday::Mon));
        assert_eq!(text("2024-01-29 17:45:00"), Some(Weekday::Mon));
        assert_eq!(text("2024-01-29T08:00:00"), Some(Weekday::Mon));
        assert_eq!(text("2024-01-29T08:00:00+01:00"), Some(Weekday::Mon));
        assert_eq!(text("29/01/2024 06:30:00"), Some(Weekday::Mon));
    }

    #[test]
    fn short_or_missing_years_are_unknown() {
        assert_eq!(text("29/01/24"), None);
        assert_eq!(text("1.2.3"), None);
        assert_eq!(text("24/01/29"), None);
        assert_eq!(text("0029-01-24"), None);
        assert_eq!(text("1-2-3"), None);
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(text(""), None);
        assert_eq!(text("   "), None);
        assert_eq!(text("lundi"), None);
        assert_eq!(text("29/01/24"), None);
        assert_eq!(text("2024-13-01"), None);
        assert_eq!(text("NaN"), None);
        assert_eq!(text("inf"), None);
    }
}
