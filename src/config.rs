// 語法高亮設定（隨收藏集同步）

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 設定在收藏集 conf 中的頂層鍵
pub const SETTINGS_KEY: &str = "syntax_highlighting_conf";

/// 預設語言
pub const DEFAULT_LANG: &str = "Python";

/// 語法高亮設定
///
/// 序列化後的鍵集合即為標準結構（canonical schema），
/// `sync_keys` 以此為準增刪鍵。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// 顯示行號
    #[serde(rename = "linenos")]
    pub line_numbers: bool,
    /// 用 <center> 置中片段
    #[serde(rename = "centerfragments")]
    pub center_fragments: bool,
    /// 使用 CSS class 而非內嵌樣式
    #[serde(rename = "cssclasses")]
    pub css_classes: bool,
    /// 每個牌組記住最後使用的語言
    #[serde(rename = "defaultlangperdeck")]
    pub default_lang_per_deck: bool,
    /// 牌組名稱 -> 語言名稱
    #[serde(rename = "deckdefaultlang")]
    pub deck_default_lang: BTreeMap<String, String>,
    /// 全域預設（最後選擇）語言
    pub lang: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            line_numbers: true,
            center_fragments: true,
            css_classes: false,
            default_lang_per_deck: true,
            deck_default_lang: BTreeMap::new(),
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

impl Settings {
    /// 標準預設值（JSON 形式）
    pub fn canonical() -> Map<String, Value> {
        match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            // Settings 一定序列化為物件
            _ => Map::new(),
        }
    }

    /// 從已同步的設定記錄讀取
    pub fn from_record(record: &Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(record.clone()))
            .with_context(|| format!("Invalid value in '{}'", SETTINGS_KEY))
    }

    /// 轉回設定記錄
    pub fn to_record(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self).context("Failed to serialize settings")? {
            Value::Object(map) => Ok(map),
            other => anyhow::bail!("Settings serialized to non-object: {}", other),
        }
    }

    pub fn get(&self, pref: Preference) -> bool {
        match pref {
            Preference::LineNumbers => self.line_numbers,
            Preference::CenterFragments => self.center_fragments,
            Preference::CssClasses => self.css_classes,
            Preference::DefaultLangPerDeck => self.default_lang_per_deck,
        }
    }

    pub fn set(&mut self, pref: Preference, value: bool) {
        let slot = match pref {
            Preference::LineNumbers => &mut self.line_numbers,
            Preference::CenterFragments => &mut self.center_fragments,
            Preference::CssClasses => &mut self.css_classes,
            Preference::DefaultLangPerDeck => &mut self.default_lang_per_deck,
        };
        *slot = value;
    }

    /// 切換布林選項（選項對話框的勾選框）
    pub fn toggle(&mut self, pref: Preference) {
        let current = self.get(pref);
        self.set(pref, !current);
    }
}

/// 可切換的布林選項
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preference {
    LineNumbers,
    CenterFragments,
    CssClasses,
    DefaultLangPerDeck,
}

impl Preference {
    pub const ALL: [Preference; 4] = [
        Preference::LineNumbers,
        Preference::CenterFragments,
        Preference::CssClasses,
        Preference::DefaultLangPerDeck,
    ];

    /// 設定記錄中的鍵名
    pub fn key(self) -> &'static str {
        match self {
            Preference::LineNumbers => "linenos",
            Preference::CenterFragments => "centerfragments",
            Preference::CssClasses => "cssclasses",
            Preference::DefaultLangPerDeck => "defaultlangperdeck",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Preference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Preference::ALL
            .into_iter()
            .find(|pref| pref.key() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown option '{}'", s))
    }
}

/// 使設定記錄的鍵集合與標準結構一致
///
/// 刪除 `reference` 中沒有的鍵，補上缺少的鍵（使用預設值），
/// 已存在的鍵保留使用者的值。回傳是否有變動。
pub fn sync_keys(tosync: &mut Map<String, Value>, reference: &Map<String, Value>) -> bool {
    let obsolete: Vec<String> = tosync
        .keys()
        .filter(|key| !reference.contains_key(*key))
        .cloned()
        .collect();
    for key in &obsolete {
        log::debug!("Removing obsolete option '{}'", key);
        tosync.remove(key);
    }

    let mut added = 0;
    for (key, value) in reference {
        if !tosync.contains_key(key) {
            log::debug!("Adding missing option '{}'", key);
            tosync.insert(key.clone(), value.clone());
            added += 1;
        }
    }

    !obsolete.is_empty() || added > 0
}

/// 將型別與預設值不符的鍵重設為預設值
///
/// 牌組語言表中不是字串的項目會被移除。回傳是否有變動。
pub fn repair_types(record: &mut Map<String, Value>, reference: &Map<String, Value>) -> bool {
    let mut repaired = false;

    for (key, default) in reference {
        let Some(value) = record.get_mut(key) else {
            continue;
        };
        if std::mem::discriminant(&*value) != std::mem::discriminant(default) {
            log::warn!(
                "Option '{}' has invalid value {}, resetting to {}",
                key,
                value,
                default
            );
            *value = default.clone();
            repaired = true;
        } else if let Value::Object(entries) = value {
            let before = entries.len();
            entries.retain(|deck, lang| {
                let keep = lang.is_string();
                if !keep {
                    log::warn!("Dropping invalid language {} for deck '{}'", lang, deck);
                }
                keep
            });
            repaired |= entries.len() != before;
        }
    }

    repaired
}
