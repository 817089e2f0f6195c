use crate::host::TextSource;
use anyhow::Result;
use arboard::Clipboard;

pub struct ClipboardManager {
    clipboard: Option<Clipboard>,
}

impl ClipboardManager {
    pub fn new() -> Self {
        // 嘗試初始化剪貼簿，如果失敗（如無圖形界面）則設為 None
        let clipboard = Clipboard::new().ok();
        if clipboard.is_none() {
            log::warn!("Clipboard not available (no GUI detected)");
        }
        Self { clipboard }
    }

    /// 以 HTML 格式寫入（附純文字備援）
    pub fn set_html(&mut self, html: &str) -> Result<()> {
        if let Some(clipboard) = &mut self.clipboard {
            clipboard.set_html(html, Some(html))?;
            Ok(())
        } else {
            Err(anyhow::anyhow!("Clipboard not available"))
        }
    }

    pub fn get_text(&mut self) -> Result<String> {
        if let Some(clipboard) = &mut self.clipboard {
            let text = clipboard.get_text()?;
            Ok(text)
        } else {
            Err(anyhow::anyhow!("Clipboard not available"))
        }
    }
}

impl Default for ClipboardManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 選取文字（檔案或標準輸入）加上剪貼簿備援
pub struct Selection<'a> {
    text: String,
    clipboard: &'a mut ClipboardManager,
}

impl<'a> Selection<'a> {
    pub fn new(text: Option<String>, clipboard: &'a mut ClipboardManager) -> Self {
        Self {
            text: text.unwrap_or_default(),
            clipboard,
        }
    }
}

impl TextSource for Selection<'_> {
    fn selected_text(&mut self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn clipboard_text(&mut self) -> Result<String> {
        self.clipboard.get_text()
    }
}
