//! Idle/Tracking session state machine that turns a start and a stop into a
//! stored [`Record`].

use crate::dates::local_date;
use crate::errors::StoreResult;
use crate::format::{format_minutes, format_timer};
use crate::models::{Record, SessionStatus};
use crate::records::RecordStore;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

/// Lower bound applied to every recorded duration, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    pub minimum_secs: u64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self { minimum_secs: 1 }
    }
}

impl DurationPolicy {
    pub fn new(minimum_secs: u64) -> Self {
        Self { minimum_secs }
    }

    /// Whole seconds between `start` and `end`, floored, never below the minimum.
    pub fn duration(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
        let elapsed = u64::try_from((end - start).num_seconds()).unwrap_or(0);
        elapsed.max(self.minimum_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Tracking {
        started_at: DateTime<Utc>,
    },
}

#[derive(Debug, Default)]
pub struct SessionTracker {
    state: SessionState,
    policy: DurationPolicy,
}

impl SessionTracker {
    pub fn new(policy: DurationPolicy) -> Self {
        Self {
            state: SessionState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, SessionState::Tracking { .. })
    }

    /// Begins a session at `now`. Returns `false` and changes nothing when a
    /// session is already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_tracking() {
            return false;
        }
        self.state = SessionState::Tracking { started_at: now };
        info!(started_at = %now, "session started");
        true
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<u64> {
        match self.state {
            SessionState::Tracking { started_at } => {
                Some(u64::try_from((now - started_at).num_seconds()).unwrap_or(0))
            }
            SessionState::Idle => None,
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        let elapsed = self.elapsed(now).unwrap_or(0);
        SessionStatus {
            tracking: self.is_tracking(),
            started_at: match self.state {
                SessionState::Tracking { started_at } => Some(started_at),
                SessionState::Idle => None,
            },
            elapsed_seconds: elapsed,
            elapsed_label: format_timer(i64::try_from(elapsed).unwrap_or(i64::MAX)),
        }
    }

    /// Ends the running session at `now` and appends its record.
    ///
    /// The tracker is idle afterwards even when the append fails; the error is
    /// returned so the caller can report it. Stopping an idle tracker is a
    /// no-op that yields `Ok(None)`.
    pub async fn stop<Tz: TimeZone>(
        &mut self,
        now: DateTime<Utc>,
        location: Option<String>,
        tz: &Tz,
        store: &RecordStore,
    ) -> StoreResult<Option<Record>> {
        let SessionState::Tracking { started_at } = self.state else {
            return Ok(None);
        };
        self.state = SessionState::Idle;

        let record = Record {
            id: now.timestamp_millis().to_string(),
            start_time: started_at,
            end_time: now,
            duration: self.policy.duration(started_at, now),
            location: location
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            date: local_date(&now, tz),
        };

        if let Err(err) = store.append(record.clone()).await {
            warn!(id = %record.id, "failed to store session: {err}");
            return Err(err);
        }

        info!(
            id = %record.id,
            date = %record.date,
            duration = %format_minutes(record.duration),
            "session stopped"
        );
        Ok(Some(record))
    }
}
