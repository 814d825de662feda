pub mod app;
pub mod clock;
pub mod config;
pub mod dates;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod kv;
pub mod models;
pub mod records;
pub mod settings;
pub mod state;
pub mod stats;
pub mod tracker;

pub use app::router;
pub use clock::{Clock, SystemClock};
pub use config::{Config, CorruptPolicy};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use records::RecordStore;
pub use settings::SettingsStore;
pub use state::AppState;
pub use tracker::{DurationPolicy, SessionTracker};
