// 宿主程式介面：目前牌組、選取文字／剪貼簿、插入 HTML

use anyhow::Result;

/// 提供目前開啟的牌組
pub trait DeckProvider {
    /// 沒有載入收藏集或牌組時可以回傳錯誤
    fn current_deck(&self) -> Result<String>;
}

/// 取得要高亮的文字
pub trait TextSource {
    /// 編輯欄位中的選取文字（可能為空）
    fn selected_text(&mut self) -> Result<String>;
    /// 剪貼簿文字
    fn clipboard_text(&mut self) -> Result<String>;
}

/// 在游標位置插入 HTML
pub trait HtmlSink {
    fn insert_html(&mut self, html: &str) -> Result<()>;
}

/// 取得目前牌組名稱，任何失敗都視為沒有開啟牌組
pub fn deck_name(provider: &dyn DeckProvider) -> Option<String> {
    match provider.current_deck() {
        Ok(name) if !name.is_empty() => Some(name),
        Ok(_) => None,
        Err(e) => {
            log::debug!("No deck opened: {}", e);
            None
        }
    }
}

/// 固定的牌組（命令列指定）
#[derive(Debug, Clone, Default)]
pub struct FixedDeck(pub Option<String>);

impl DeckProvider for FixedDeck {
    fn current_deck(&self) -> Result<String> {
        self.0
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No deck selected"))
    }
}

impl HtmlSink for String {
    fn insert_html(&mut self, html: &str) -> Result<()> {
        self.push_str(html);
        Ok(())
    }
}
