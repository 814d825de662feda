//! Calendar bucketing helpers shared by the stores and the statistics engine.
//!
//! Everything here is pure: results depend only on the arguments and the
//! timezone passed in, never on the process environment.

use crate::errors::{StoreError, StoreResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Half-open interval of instants: `start` is included, `end` is the first
/// instant of the following period and is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Calendar date of `instant` as seen in `tz`, formatted `YYYY-MM-DD`.
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String {
    date_key(instant.with_timezone(tz).date_naive())
}

/// Thursday of the Monday-start week containing `date`.
fn week_thursday(date: NaiveDate) -> NaiveDate {
    date + Duration::days(3 - i64::from(date.weekday().num_days_from_monday()))
}

/// ISO-8601 week number: the week holding the year's first Thursday is week 1.
pub fn iso_week_number(date: NaiveDate) -> u32 {
    week_thursday(date).ordinal0() / 7 + 1
}

/// Year that owns the ISO week of `date`; differs from `date.year()` around
/// New Year.
pub fn iso_week_year(date: NaiveDate) -> i32 {
    week_thursday(date).year()
}

pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// First and last day of the month containing `date`.
pub fn month_span(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Duration::days(i64::from(date.day0()));
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(year, month, 1).map_or(first, |next| next - Duration::days(1));
    (first, last)
}

/// First and last day of `month` (1-12) in `year`.
pub fn month_bounds(year: i32, month: u32) -> StoreResult<(NaiveDate, NaiveDate)> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(month_span)
        .ok_or_else(|| StoreError::invalid(format!("no such month: {year}-{month}")))
}

pub fn days_in_month(year: i32, month: u32) -> StoreResult<u32> {
    month_bounds(year, month).map(|(_, last)| last.day())
}

/// Every date of the month in ascending order.
pub fn month_days(year: i32, month: u32) -> StoreResult<impl Iterator<Item = NaiveDate>> {
    let (first, last) = month_bounds(year, month)?;
    Ok(first.iter_days().take_while(move |day| *day <= last))
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    // A local midnight can fall in a DST gap; the hour after it always exists.
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// Local days `first..=last` as instants; the end is the next day's midnight.
fn days_interval<Tz: TimeZone>(first: NaiveDate, last: NaiveDate, tz: &Tz) -> Interval {
    Interval {
        start: start_of_day(first, tz),
        end: start_of_day(last + Duration::days(1), tz),
    }
}

pub fn day_interval<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Interval {
    days_interval(date, date, tz)
}

pub fn week_interval<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Interval {
    let (monday, sunday) = week_bounds(date);
    days_interval(monday, sunday, tz)
}

pub fn month_interval<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Interval {
    let (first, last) = month_span(date);
    days_interval(first, last, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn iso_week_reference_values() {
        assert_eq!(iso_week_number(ymd(2024, 1, 1)), 1);
        assert_eq!(iso_week_number(ymd(2020, 12, 31)), 53);
        assert_eq!(iso_week_number(ymd(2021, 1, 3)), 53);
        assert_eq!(iso_week_number(ymd(2021, 1, 4)), 1);
        assert_eq!(iso_week_number(ymd(2024, 12, 30)), 1);
        assert_eq!(iso_week_year(ymd(2024, 12, 30)), 2025);
        assert_eq!(iso_week_year(ymd(2021, 1, 3)), 2020);
    }

    #[test]
    fn iso_week_agrees_with_chrono_for_a_decade() {
        let mut day = ymd(2018, 1, 1);
        while day < ymd(2029, 1, 1) {
            let iso = day.iso_week();
            assert_eq!(iso_week_number(day), iso.week(), "{day}");
            assert_eq!(iso_week_year(day), iso.year(), "{day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn local_date_follows_timezone() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(local_date(&instant, &Utc), "2024-03-01");
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(local_date(&instant, &tokyo), "2024-03-02");
        let early = Utc.with_ymd_and_hms(2024, 1, 5, 3, 0, 0).unwrap();
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(local_date(&early, &new_york), "2024-01-04");
    }

    #[test]
    fn month_bounds_handle_lengths_and_reject_bad_months() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (ymd(2024, 2, 1), ymd(2024, 2, 29)));
        assert_eq!(month_bounds(2023, 2).unwrap().1, ymd(2023, 2, 28));
        assert_eq!(month_bounds(2024, 12).unwrap().1, ymd(2024, 12, 31));
        assert_eq!(days_in_month(2024, 4).unwrap(), 30);
        assert!(matches!(month_bounds(2024, 0), Err(StoreError::InvalidArgument(_))));
        assert!(matches!(month_bounds(2024, 13), Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn month_days_are_dense_and_ordered() {
        let days: Vec<_> = month_days(2024, 4).unwrap().collect();
        assert_eq!(days.len(), 30);
        assert_eq!(days.first(), Some(&ymd(2024, 4, 1)));
        assert_eq!(days.last(), Some(&ymd(2024, 4, 30)));
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn week_bounds_start_on_monday() {
        // 2024-03-06 is a Wednesday.
        assert_eq!(week_bounds(ymd(2024, 3, 6)), (ymd(2024, 3, 4), ymd(2024, 3, 10)));
        assert_eq!(week_bounds(ymd(2024, 3, 10)), (ymd(2024, 3, 4), ymd(2024, 3, 10)));
        assert_eq!(week_bounds(ymd(2024, 3, 4)), (ymd(2024, 3, 4), ymd(2024, 3, 10)));
    }

    #[test]
    fn day_interval_follows_local_midnights() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let interval = day_interval(ymd(2024, 3, 1), &tz);
        assert_eq!(interval.start, Utc.with_ymd_and_hms(2024, 2, 29, 22, 0, 0).unwrap());
        assert_eq!(interval.end, Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap());
        assert!(interval.contains(&interval.start));
        assert!(interval.contains(&(interval.end - Duration::milliseconds(1))));
        assert!(!interval.contains(&interval.end));
        assert!(!interval.contains(&(interval.start - Duration::milliseconds(1))));
    }

    #[test]
    fn sub_millisecond_instants_land_in_exactly_one_day() {
        let last_tick =
            Utc.with_ymd_and_hms(2024, 3, 13, 23, 59, 59).unwrap() + Duration::nanoseconds(999_500_000);
        let today = day_interval(ymd(2024, 3, 13), &Utc);
        let tomorrow = day_interval(ymd(2024, 3, 14), &Utc);
        assert!(today.contains(&last_tick));
        assert!(!tomorrow.contains(&last_tick));
        assert_eq!(today.end, tomorrow.start);
    }

    #[test]
    fn month_interval_covers_whole_month() {
        let interval = month_interval(ymd(2024, 2, 14), &Utc);
        assert_eq!(interval.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(interval.end, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let week = week_interval(ymd(2024, 3, 13), &Utc);
        assert_eq!(week.start, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
        assert_eq!(week.end, Utc.with_ymd_and_hms(2024, 3, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn date_keys_round_trip() {
        assert_eq!(date_key(ymd(2024, 3, 1)), "2024-03-01");
        assert_eq!(parse_date_key("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date_key("2024-3-1x"), None);
    }
}
