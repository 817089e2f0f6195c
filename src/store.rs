//! 收藏集設定存檔
//!
//! 對應宿主程式的 `collection.conf`：一個以字串為鍵的 JSON 物件，
//! 只有在標記為已修改時才會寫回磁碟。

use crate::config::{repair_types, sync_keys, Settings, SETTINGS_KEY};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfStore {
    conf: Map<String, Value>,
    path: Option<PathBuf>,
    modified: bool,
}

impl ConfStore {
    /// 建立只存在於記憶體的設定存檔
    pub fn new() -> Self {
        Self {
            conf: Map::new(),
            path: None,
            modified: false,
        }
    }

    /// 從檔案載入（檔案不存在時視為空的設定）
    pub fn load(path: &Path) -> Result<Self> {
        let conf = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if text.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
                {
                    Value::Object(map) => map,
                    _ => anyhow::bail!("{} is not a JSON object", path.display()),
                }
            }
        } else {
            log::info!("No collection config at {}, starting empty", path.display());
            Map::new()
        };

        Ok(Self {
            conf,
            path: Some(path.to_path_buf()),
            modified: false,
        })
    }

    /// 預設設定檔路徑
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Cannot determine config directory")?;
        Ok(dir.join("codecard").join("collection.json"))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.conf.get(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.conf.insert(key.to_string(), value);
        self.set_mod();
    }

    /// 標記為已修改
    pub fn set_mod(&mut self) {
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 讀取型別化的設定（呼叫前應先同步）
    pub fn settings(&self) -> Result<Settings> {
        match self.conf.get(SETTINGS_KEY) {
            Some(Value::Object(record)) => Settings::from_record(record),
            _ => anyhow::bail!("'{}' missing from collection config", SETTINGS_KEY),
        }
    }

    /// 寫回設定並標記為已修改
    pub fn put_settings(&mut self, settings: &Settings) -> Result<()> {
        let record = settings.to_record()?;
        self.insert(SETTINGS_KEY, Value::Object(record));
        Ok(())
    }

    /// 同步後修改設定並寫回
    pub fn update_settings<F>(&mut self, update: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        sync_config_with_default(self);
        let mut settings = self.settings()?;
        update(&mut settings);
        self.put_settings(&settings)?;
        Ok(settings)
    }

    /// 寫回磁碟（未修改或沒有路徑時不動作）
    pub fn save(&mut self) -> Result<()> {
        if !self.modified {
            return Ok(());
        }
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.conf)
            .context("Failed to serialize collection config")?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Saved collection config to {}", path.display());

        self.modified = false;
        Ok(())
    }
}

impl Default for ConfStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 將設定記錄與預設結構同步
///
/// 記錄不存在時以預設值完整建立；型別錯誤的值重設為預設值。
/// 無論是否有變動都標記為已修改，否則宿主程式可能不會寫回。
pub fn sync_config_with_default(store: &mut ConfStore) {
    let canonical = Settings::canonical();

    match store.conf.get_mut(SETTINGS_KEY) {
        Some(Value::Object(record)) => {
            if sync_keys(record, &canonical) {
                log::info!("Synchronized '{}' with default options", SETTINGS_KEY);
            }
            repair_types(record, &canonical);
        }
        Some(other) => {
            log::warn!(
                "'{}' is not an object ({}), resetting to defaults",
                SETTINGS_KEY,
                other
            );
            store
                .conf
                .insert(SETTINGS_KEY.to_string(), Value::Object(canonical));
        }
        None => {
            log::info!("Initializing '{}' with default options", SETTINGS_KEY);
            store
                .conf
                .insert(SETTINGS_KEY.to_string(), Value::Object(canonical));
        }
    }

    store.set_mod();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_sync_initializes_missing_record() {
        let mut store = ConfStore::new();
        assert!(!store.is_modified());
        sync_config_with_default(&mut store);
        assert!(store.is_modified());
        assert_eq!(store.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_sync_preserves_unrelated_conf_keys() {
        let mut store = ConfStore::new();
        store.insert("curDeck", json!(1));
        store.insert(SETTINGS_KEY, json!({"lang": "Go", "stale": true}));
        sync_config_with_default(&mut store);

        assert_eq!(store.get("curDeck"), Some(&json!(1)));
        let settings = store.settings().unwrap();
        assert_eq!(settings.lang, "Go");
        assert!(settings.line_numbers);
        assert!(store.get(SETTINGS_KEY).unwrap().get("stale").is_none());
    }

    #[test]
    fn test_sync_resets_non_object_record() {
        let mut store = ConfStore::new();
        store.insert(SETTINGS_KEY, json!("garbage"));
        sync_config_with_default(&mut store);
        assert_eq!(store.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_sync_repairs_wrong_typed_value() {
        let mut store = ConfStore::new();
        store.insert(SETTINGS_KEY, json!({"linenos": "yes", "lang": "Go"}));
        sync_config_with_default(&mut store);

        let settings = store.settings().unwrap();
        assert!(settings.line_numbers);
        assert_eq!(settings.lang, "Go");

        let settings = store
            .update_settings(|s| s.set(crate::config::Preference::LineNumbers, false))
            .unwrap();
        assert!(!settings.line_numbers);
    }

    #[test]
    fn test_update_settings_syncs_first() {
        let mut store = ConfStore::new();
        store.insert(SETTINGS_KEY, json!({"linenos": false, "removed": 1}));
        let settings = store
            .update_settings(|s| s.toggle(crate::config::Preference::LineNumbers))
            .unwrap();
        assert!(settings.line_numbers);
        assert_eq!(store.settings().unwrap(), settings);
        assert!(store.get(SETTINGS_KEY).unwrap().get("removed").is_none());
    }

    #[test]
    fn test_settings_before_sync_is_error() {
        let store = ConfStore::new();
        assert!(store.settings().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("collection.json");

        let mut store = ConfStore::load(&path).unwrap();
        sync_config_with_default(&mut store);
        let mut settings = store.settings().unwrap();
        settings.lang = "Rust".into();
        store.put_settings(&settings).unwrap();
        store.save().unwrap();
        assert!(!store.is_modified());

        let reloaded = ConfStore::load(&path).unwrap();
        assert_eq!(reloaded.settings().unwrap().lang, "Rust");
    }

    #[test]
    fn test_save_skips_when_unmodified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("collection.json");
        let mut store = ConfStore::load(&path).unwrap();
        store.save().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("collection.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(ConfStore::load(&path).is_err());
    }
}
