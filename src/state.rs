use crate::clock::Clock;
use crate::config::Config;
use crate::kv::KeyValueStore;
use crate::records::RecordStore;
use crate::settings::SettingsStore;
use crate::tracker::{DurationPolicy, SessionTracker};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub records: RecordStore,
    pub settings: SettingsStore,
    pub tracker: Arc<Mutex<SessionTracker>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let policy = DurationPolicy::new(config.minimum_duration_secs);
        Self {
            records: RecordStore::new(Arc::clone(&kv), config.on_corrupt),
            settings: SettingsStore::new(kv, config.on_corrupt),
            tracker: Arc::new(Mutex::new(SessionTracker::new(policy))),
            clock,
        }
    }
}
