use crate::dates::{day_interval, date_key, month_interval, month_span, week_interval, Interval};
use crate::models::{
    DashboardStats, DayOverview, MonthlyStats, PeriodMode, PeriodStats, Record, Summary,
};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeSet, HashMap};

/// Year length used for the yearly average; leap years are not special-cased.
const YEAR_DAYS: u32 = 365;

pub fn summarize<'a>(records: impl IntoIterator<Item = &'a Record>) -> Summary {
    let (total_count, total_duration) = records
        .into_iter()
        .fold((0u64, 0u64), |(count, total), record| {
            (count + 1, total.saturating_add(record.duration))
        });

    Summary {
        total_count,
        total_duration,
        average_duration: rounded_mean(total_duration, total_count),
    }
}

pub fn monthly_stats(records: &[Record]) -> MonthlyStats {
    let summary = summarize(records);
    let dates: BTreeSet<&str> = records.iter().map(|record| record.date.as_str()).collect();

    MonthlyStats {
        total_count: summary.total_count,
        total_duration: summary.total_duration,
        avg_duration: summary.average_duration,
        dates_with_records: dates.into_iter().map(str::to_string).collect(),
    }
}

pub fn period_length(mode: PeriodMode, anchor: NaiveDate) -> u32 {
    match mode {
        PeriodMode::Day => 1,
        PeriodMode::Week => 7,
        PeriodMode::Month => month_span(anchor).1.day(),
        PeriodMode::Year => YEAR_DAYS,
    }
}

/// Aggregates over records already filtered to the period around `anchor`.
pub fn period_stats(mode: PeriodMode, anchor: NaiveDate, records: &[Record]) -> PeriodStats {
    let summary = summarize(records);
    let durations = records.iter().map(|record| record.duration);

    PeriodStats {
        total_count: summary.total_count,
        avg_count: summary.total_count as f64 / f64::from(period_length(mode, anchor)),
        total_duration: summary.total_duration,
        avg_duration: summary.average_duration,
        longest_duration: durations.clone().max().unwrap_or(0),
        shortest_duration: durations.min().unwrap_or(0),
    }
}

/// Today, this week (Monday to Sunday) and this month around `reference`,
/// bucketed by `end_time` in the reference's timezone.
pub fn dashboard<Tz: TimeZone>(records: &[Record], reference: &DateTime<Tz>) -> DashboardStats {
    let tz = reference.timezone();
    let local = reference.date_naive();

    let within = |interval: Interval| {
        summarize(
            records
                .iter()
                .filter(move |record| interval.contains(&record.end_time)),
        )
    };

    DashboardStats {
        today: within(day_interval(local, &tz)),
        week: within(week_interval(local, &tz)),
        month: within(month_interval(local, &tz)),
    }
}

/// [`dashboard`] anchored at `now` as seen in `tz`.
pub fn dashboard_now<Tz: TimeZone>(records: &[Record], now: DateTime<Utc>, tz: &Tz) -> DashboardStats {
    dashboard(records, &now.with_timezone(tz))
}

pub fn monthly_overview<Tz: TimeZone>(
    records: &[Record],
    reference: &DateTime<Tz>,
) -> Vec<DayOverview> {
    monthly_overview_for(records, reference.date_naive())
}

/// One entry per day of the month containing `date`, zero-filled.
pub fn monthly_overview_for(records: &[Record], date: NaiveDate) -> Vec<DayOverview> {
    let mut per_day: HashMap<&str, (u64, u64)> = HashMap::new();
    for record in records {
        let entry = per_day.entry(record.date.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(record.duration);
    }

    let (first, last) = month_span(date);
    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| {
            let key = date_key(day);
            let (count, total_duration) = per_day.get(key.as_str()).copied().unwrap_or_default();
            DayOverview {
                date: key,
                count,
                total_duration,
            }
        })
        .collect()
}

/// `round(total / count)` with halves rounded up, zero for an empty set.
fn rounded_mean(total: u64, count: u64) -> u64 {
    if count == 0 {
        0
    } else {
        total.saturating_add(count / 2) / count
    }
}
