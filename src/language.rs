//! 語言清單與每個牌組的預設語言

use crate::config::Settings;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use syntect::parsing::SyntaxSet;

/// 全域語言清單（程式啟動後只建立一次）
static CATALOG: Lazy<LanguageCatalog> =
    Lazy::new(|| LanguageCatalog::from_syntax_set(crate::highlight::syntax_set()));

/// 語言名稱 -> 語法別名
///
/// 顯示給使用者的是完整名稱，高亮引擎使用簡短別名。
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    langs: BTreeMap<String, String>,
}

impl LanguageCatalog {
    pub fn global() -> &'static LanguageCatalog {
        &CATALOG
    }

    /// 從語法集建立；同名語法以第一個為準
    pub fn from_syntax_set(syntax_set: &SyntaxSet) -> Self {
        let mut langs = BTreeMap::new();
        for syntax in syntax_set.syntaxes() {
            if syntax.hidden {
                continue;
            }
            let alias = syntax
                .file_extensions
                .first()
                .cloned()
                .unwrap_or_else(|| syntax.name.to_lowercase());
            langs.entry(syntax.name.clone()).or_insert(alias);
        }
        Self { langs }
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.langs.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.langs.contains_key(name)
    }

    /// 依名稱排序
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.langs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.langs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.langs.is_empty()
    }
}

impl FromIterator<(String, String)> for LanguageCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut langs = BTreeMap::new();
        for (name, alias) in iter {
            langs.entry(name).or_insert(alias);
        }
        Self { langs }
    }
}

/// 下一次高亮要預選的語言
pub fn get_default_language<'a>(settings: &'a Settings, deck: Option<&str>) -> &'a str {
    if settings.default_lang_per_deck {
        if let Some(lang) = deck.and_then(|name| settings.deck_default_lang.get(name)) {
            return lang;
        }
    }
    &settings.lang
}

/// 記錄使用者明確選擇的語言
///
/// 全域預設一律更新；啟用每牌組記憶且有開啟的牌組時，另外記錄到該牌組。
pub fn set_default_language(settings: &mut Settings, deck: Option<&str>, language: &str) {
    settings.lang = language.to_string();
    if !settings.default_lang_per_deck {
        return;
    }
    match deck {
        Some(name) => {
            settings
                .deck_default_lang
                .insert(name.to_string(), language.to_string());
        }
        None => log::debug!("No deck open, only updating global language"),
    }
}
