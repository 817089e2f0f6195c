use crate::config::DEFAULT_LANG;
use crate::highlight::{normalize_selection, wrap_fragment, HighlightEngine, HighlightOptions};
use crate::host::{deck_name, DeckProvider, HtmlSink, TextSource};
use crate::language::{get_default_language, set_default_language, LanguageCatalog};
use crate::store::{sync_config_with_default, ConfStore};
use anyhow::{Context, Result};

/// 編輯器上的高亮按鈕與語言選單
pub struct Editor {
    engine: HighlightEngine,
    catalog: &'static LanguageCatalog,
    lang_name: String,
    lang_alias: String,
}

impl Editor {
    /// 編輯器建立時呼叫：同步設定並預選語言
    pub fn on_editor_ready(
        store: &mut ConfStore,
        decks: &dyn DeckProvider,
        engine: HighlightEngine,
    ) -> Result<Self> {
        Self::with_catalog(store, decks, engine, LanguageCatalog::global())
    }

    pub fn with_catalog(
        store: &mut ConfStore,
        decks: &dyn DeckProvider,
        engine: HighlightEngine,
        catalog: &'static LanguageCatalog,
    ) -> Result<Self> {
        sync_config_with_default(store);
        let settings = store.settings()?;
        let deck = deck_name(decks);
        let previous = get_default_language(&settings, deck.as_deref());

        let (lang_name, lang_alias) = match catalog.alias(previous) {
            Some(alias) => (previous.to_string(), alias.to_string()),
            None => {
                log::warn!(
                    "Language '{}' is not available, falling back to {}",
                    previous,
                    DEFAULT_LANG
                );
                let alias = catalog
                    .alias(DEFAULT_LANG)
                    .with_context(|| format!("Default language {} is not available", DEFAULT_LANG))?;
                (DEFAULT_LANG.to_string(), alias.to_string())
            }
        };
        log::debug!("Editor ready with language {} ({})", lang_name, lang_alias);

        Ok(Self {
            engine,
            catalog,
            lang_name,
            lang_alias,
        })
    }

    /// 目前選擇的語言名稱
    pub fn language(&self) -> &str {
        &self.lang_name
    }

    /// 目前語言的別名
    pub fn alias(&self) -> &str {
        &self.lang_alias
    }

    pub fn engine(&self) -> &HighlightEngine {
        &self.engine
    }

    /// 語言選單：預選語言在最前，其後為依名稱排序的完整清單
    pub fn language_menu(&self) -> Vec<String> {
        std::iter::once(self.lang_name.clone())
            .chain(self.catalog.names().map(str::to_string))
            .collect()
    }

    /// 使用者從選單選擇語言
    pub fn on_language_selected(
        &mut self,
        store: &mut ConfStore,
        decks: &dyn DeckProvider,
        lang: &str,
    ) -> Result<()> {
        let alias = self
            .catalog
            .alias(lang)
            .with_context(|| format!("Unknown language '{}'", lang))?
            .to_string();

        let deck = deck_name(decks);
        store.update_settings(|settings| set_default_language(settings, deck.as_deref(), lang))?;

        self.lang_name = lang.to_string();
        self.lang_alias = alias;
        Ok(())
    }

    /// 高亮選取文字（或剪貼簿）並插入到游標位置
    pub fn highlight_code(
        &self,
        store: &ConfStore,
        source: &mut dyn TextSource,
        sink: &mut dyn HtmlSink,
    ) -> Result<String> {
        let settings = store.settings()?;
        let options = HighlightOptions::from(&settings);

        let selected = source.selected_text()?;
        let code = if selected.is_empty() {
            log::debug!("Nothing selected, using clipboard");
            source.clipboard_text()?
        } else {
            normalize_selection(&selected)
        };
        if code.trim().is_empty() {
            anyhow::bail!("Nothing to highlight");
        }

        let html = self.engine.render_html(&code, &self.lang_alias, &options)?;
        let pretty_code = wrap_fragment(&html, options.line_numbers, options.center);
        sink.insert_html(&pretty_code)?;

        Ok(pretty_code)
    }
}
