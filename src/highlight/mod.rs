// 語法高亮主模組

mod engine;

pub use engine::{syntax_set, HighlightEngine, DEFAULT_THEME};

use crate::config::Settings;

/// 高亮輸出選項
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightOptions {
    /// 是否顯示行號
    pub line_numbers: bool,
    /// 是否置中片段
    pub center: bool,
    /// 使用 CSS class（否則內嵌樣式）
    pub css_classes: bool,
}

impl From<&Settings> for HighlightOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            line_numbers: settings.line_numbers,
            center: settings.center_fragments,
            css_classes: settings.css_classes,
        }
    }
}

/// 將選取文字中的不換行空白（U+00A0）換成一般空白
///
/// 從編輯欄位選取的文字常帶有 U+00A0，會讓詞法分析出錯。
pub fn normalize_selection(text: &str) -> String {
    text.replace('\u{00A0}', " ")
}

/// 依行號與置中設定包裝高亮結果
///
/// 沒有行號時必須放進單格表格，否則左邊界對齊會跑掉。
pub fn wrap_fragment(html: &str, line_numbers: bool, center: bool) -> String {
    match (line_numbers, center) {
        (true, true) => format!("<center>{}</center><br>", html),
        (true, false) => format!("{}<br>", html),
        (false, true) => format!(
            "<center><table><tbody><tr><td>{}</td></tr></tbody></table></center><br>",
            html
        ),
        (false, false) => format!("<table><tbody><tr><td>{}</td></tr></tbody></table><br>", html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unnumbered_centered() {
        assert_eq!(
            wrap_fragment("<pre>X</pre>", false, true),
            "<center><table><tbody><tr><td><pre>X</pre></td></tr></tbody></table></center><br>"
        );
    }

    #[test]
    fn test_wrap_unnumbered_uncentered() {
        assert_eq!(
            wrap_fragment("<pre>X</pre>", false, false),
            "<table><tbody><tr><td><pre>X</pre></td></tr></tbody></table><br>"
        );
    }

    #[test]
    fn test_wrap_numbered() {
        assert_eq!(
            wrap_fragment("<pre>X</pre>", true, true),
            "<center><pre>X</pre></center><br>"
        );
        assert_eq!(wrap_fragment("<pre>X</pre>", true, false), "<pre>X</pre><br>");
    }

    #[test]
    fn test_normalize_non_breaking_space() {
        let text = "fn\u{00A0}main()\u{00A0}{}";
        assert_eq!(normalize_selection(text), "fn main() {}");
        assert_eq!(normalize_selection("plain"), "plain");
    }

    #[test]
    fn test_options_from_settings() {
        let mut settings = Settings::default();
        settings.css_classes = true;
        settings.center_fragments = false;
        let options = HighlightOptions::from(&settings);
        assert!(options.line_numbers);
        assert!(!options.center);
        assert!(options.css_classes);
    }
}
