use crate::config::CorruptPolicy;
use crate::errors::StoreResult;
use crate::kv::{KeyValueStore, decode_payload, encode_payload};
use crate::models::Settings;
use std::sync::Arc;
use tracing::info;

pub const SETTINGS_KEY: &str = "user_settings";

#[derive(Clone)]
pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
    on_corrupt: CorruptPolicy,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, on_corrupt: CorruptPolicy) -> Self {
        Self { kv, on_corrupt }
    }

    /// Stored settings with missing fields taken from [`Settings::default`].
    pub async fn get(&self) -> StoreResult<Settings> {
        match self.kv.get(SETTINGS_KEY).await? {
            Some(payload) => decode_payload(SETTINGS_KEY, &payload, self.on_corrupt),
            None => Ok(Settings::default()),
        }
    }

    /// Replaces the stored settings wholesale.
    pub async fn save(&self, settings: &Settings) -> StoreResult<()> {
        self.kv.set(SETTINGS_KEY, encode_payload(settings)?).await?;
        info!(theme = ?settings.theme_color, reminder = settings.reminder_enabled, "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::kv::{FailingStore, MemoryStore};
    use crate::models::ThemeColor;

    fn store_with(kv: Arc<MemoryStore>) -> SettingsStore {
        SettingsStore::new(kv, CorruptPolicy::UseDefault)
    }

    #[tokio::test]
    async fn absent_payload_yields_defaults() {
        let store = store_with(Arc::new(MemoryStore::new()));
        let settings = store.get().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.theme_color, ThemeColor::Pink);
        assert!(!settings.reminder_enabled);
        assert!(settings.vibration_enabled);
        assert!(settings.sound_enabled);
    }

    #[tokio::test]
    async fn get_is_idempotent_and_save_overwrites() {
        let store = store_with(Arc::new(MemoryStore::new()));
        assert_eq!(store.get().await.unwrap(), store.get().await.unwrap());

        let updated = Settings {
            name: Some("Sam".to_string()),
            theme_color: ThemeColor::Green,
            reminder_enabled: true,
            reminder_time: Some("08:30".to_string()),
            sound_enabled: false,
            ..Settings::default()
        };
        store.save(&updated).await.unwrap();
        assert_eq!(store.get().await.unwrap(), updated);
        assert_eq!(store.get().await.unwrap(), store.get().await.unwrap());

        store.save(&Settings::default()).await.unwrap();
        assert_eq!(store.get().await.unwrap().name, None);
    }

    #[tokio::test]
    async fn partial_payload_is_merged_over_defaults() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(SETTINGS_KEY, r#"{"themeColor":"blue","soundEnabled":false}"#.to_string())
            .await
            .unwrap();
        let settings = store_with(kv).get().await.unwrap();
        assert_eq!(settings.theme_color, ThemeColor::Blue);
        assert!(!settings.sound_enabled);
        assert!(settings.vibration_enabled);
    }

    #[tokio::test]
    async fn unknown_theme_keeps_other_fields() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(
            SETTINGS_KEY,
            r#"{"name":"Robin","themeColor":"purple","reminderTime":"07:45"}"#.to_string(),
        )
        .await
        .unwrap();
        let strict = SettingsStore::new(kv, CorruptPolicy::Fail);
        let settings = strict.get().await.unwrap();
        assert_eq!(settings.name.as_deref(), Some("Robin"));
        assert_eq!(settings.reminder_time.as_deref(), Some("07:45"));
        assert_eq!(settings.theme_color, ThemeColor::Pink);
    }

    #[tokio::test]
    async fn corrupt_payload_follows_policy() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(SETTINGS_KEY, "not json".to_string()).await.unwrap();
        assert_eq!(store_with(kv.clone()).get().await.unwrap(), Settings::default());

        let strict = SettingsStore::new(kv, CorruptPolicy::Fail);
        assert!(matches!(strict.get().await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let store = SettingsStore::new(Arc::new(FailingStore), CorruptPolicy::UseDefault);
        assert!(store.save(&Settings::default()).await.is_err());
    }
}
