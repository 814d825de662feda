//! Append-only log of completed sessions, persisted as one JSON array.

use crate::config::CorruptPolicy;
use crate::dates::{date_key, iso_week_number, iso_week_year, parse_date_key};
use crate::errors::{StoreError, StoreResult};
use crate::kv::{KeyValueStore, decode_payload, encode_payload};
use crate::models::{MonthlyStats, PeriodMode, Record};
use crate::stats;
use chrono::{Datelike, NaiveDate};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const RECORDS_KEY: &str = "poop_records";

#[derive(Clone)]
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    on_corrupt: CorruptPolicy,
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, on_corrupt: CorruptPolicy) -> Self {
        Self {
            kv,
            on_corrupt,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Every stored record in insertion order.
    pub async fn all(&self) -> StoreResult<Vec<Record>> {
        match self.kv.get(RECORDS_KEY).await? {
            Some(payload) => decode_payload(RECORDS_KEY, &payload, self.on_corrupt),
            None => Ok(Vec::new()),
        }
    }

    /// Loads the list, appends `record` and writes the whole list back.
    pub async fn append(&self, record: Record) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.all().await?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }

        let (id, date, duration) = (record.id.clone(), record.date.clone(), record.duration);
        records.push(record);
        self.kv.set(RECORDS_KEY, encode_payload(&records)?).await?;

        info!(%id, %date, duration, total = records.len(), "record appended");
        Ok(())
    }

    pub async fn clear(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(RECORDS_KEY).await?;
        info!("all records cleared");
        Ok(())
    }

    pub async fn by_date(&self, date: &str) -> StoreResult<Vec<Record>> {
        self.filtered(|record| record.date == date).await
    }

    pub async fn by_day(&self, year: i32, month: u32, day: u32) -> StoreResult<Vec<Record>> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| StoreError::invalid(format!("no such day: {year}-{month}-{day}")))?;
        self.by_date(&date_key(date)).await
    }

    /// Matches on the year and month components of the stored `date`.
    pub async fn by_month(&self, year: i32, month: u32) -> StoreResult<Vec<Record>> {
        if !(1..=12).contains(&month) {
            return Err(StoreError::invalid(format!("month must be 1-12, got {month}")));
        }
        self.filtered(|record| year_month(&record.date) == Some((year, month)))
            .await
    }

    /// Records whose stored `date` falls in ISO week `week` of ISO year `year`.
    pub async fn by_week(&self, year: i32, week: u32) -> StoreResult<Vec<Record>> {
        if !(1..=53).contains(&week) {
            return Err(StoreError::invalid(format!("week must be 1-53, got {week}")));
        }
        self.filtered(|record| {
            parse_date_key(&record.date)
                .is_some_and(|date| iso_week_year(date) == year && iso_week_number(date) == week)
        })
        .await
    }

    pub async fn by_year(&self, year: i32) -> StoreResult<Vec<Record>> {
        self.filtered(|record| year_of(&record.date) == Some(year))
            .await
    }

    /// Records of the day, ISO week, month or year that contains `anchor`.
    pub async fn records_for_period(
        &self,
        mode: PeriodMode,
        anchor: NaiveDate,
    ) -> StoreResult<Vec<Record>> {
        match mode {
            PeriodMode::Day => self.by_date(&date_key(anchor)).await,
            PeriodMode::Week => {
                self.by_week(iso_week_year(anchor), iso_week_number(anchor))
                    .await
            }
            PeriodMode::Month => self.by_month(anchor.year(), anchor.month()).await,
            PeriodMode::Year => self.by_year(anchor.year()).await,
        }
    }

    /// The record with the greatest `end_time`.
    pub async fn latest(&self) -> StoreResult<Option<Record>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .max_by_key(|record| record.end_time))
    }

    /// Sparse calendar view keyed by the stored `date`.
    pub async fn grouped_by_date(&self) -> StoreResult<BTreeMap<String, Vec<Record>>> {
        let mut grouped: BTreeMap<String, Vec<Record>> = BTreeMap::new();
        for record in self.all().await? {
            grouped.entry(record.date.clone()).or_default().push(record);
        }
        Ok(grouped)
    }

    pub async fn monthly_stats(&self, year: i32, month: u32) -> StoreResult<MonthlyStats> {
        let records = self.by_month(year, month).await?;
        Ok(stats::monthly_stats(&records))
    }

    async fn filtered(&self, keep: impl Fn(&Record) -> bool) -> StoreResult<Vec<Record>> {
        let records: Vec<Record> = self.all().await?.into_iter().filter(|r| keep(r)).collect();
        debug!(matched = records.len(), "filtered records");
        Ok(records)
    }
}

// Stored dates are split on '-' rather than parsed as calendar dates.
fn year_of(date: &str) -> Option<i32> {
    date.split('-').next()?.parse().ok()
}

fn year_month(date: &str) -> Option<(i32, u32)> {
    let mut parts = date.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    Some((year, month))
}
