//! 語法高亮引擎
//!
//! 使用 syntect 內建的語法集與主題，輸出可直接貼進卡片欄位的 HTML。
//!
//! 實現特點：
//! - 內嵌樣式（自足的 HTML）或 CSS class 兩種輸出
//! - 行號以兩欄表格呈現

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::html::{
    css_for_theme_with_class_style, styled_line_to_highlighted_html, ClassStyle,
    ClassedHTMLGenerator, IncludeBackground,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::HighlightOptions;

/// 預設主題（淺色背景，適合卡片）
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// CSS class 模式使用的樣式
const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

/// 全域語法集（延遲載入，保留換行符）
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// 全域主題集（使用 syntect 內建主題）
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// 供語言清單使用的語法集
pub fn syntax_set() -> &'static SyntaxSet {
    &SYNTAX_SET
}

/// 語法高亮引擎
pub struct HighlightEngine {
    theme: &'static Theme,
    theme_name: String,
}

impl HighlightEngine {
    /// 建立新的高亮引擎
    pub fn new(theme_name: Option<&str>) -> Result<Self> {
        let theme_name = theme_name.unwrap_or(DEFAULT_THEME);
        let theme = THEME_SET
            .themes
            .get(theme_name)
            .with_context(|| format!("Theme '{}' not found", theme_name))?;

        Ok(Self {
            theme,
            theme_name: theme_name.to_string(),
        })
    }

    /// 取得可用主題清單
    pub fn available_themes() -> Vec<String> {
        THEME_SET.themes.keys().cloned().collect()
    }

    fn find_syntax(alias: &str) -> Result<&'static SyntaxReference> {
        SYNTAX_SET
            .find_syntax_by_token(alias)
            .with_context(|| format!("Unknown language alias '{}'", alias))
    }

    /// 高亮程式碼並輸出 HTML（未包裝）
    pub fn render_html(&self, code: &str, alias: &str, options: &HighlightOptions) -> Result<String> {
        let syntax = Self::find_syntax(alias)?;
        let code = prepare_code(code);

        let block = if options.css_classes {
            let body = self.classed_body(&code, syntax)?;
            format!("<div class=\"highlight\"><pre class=\"code\">{}</pre></div>", body)
        } else {
            let body = self.inline_body(&code, syntax)?;
            format!(
                "<div class=\"highlight\" style=\"background: {}\"><pre style=\"line-height: 125%; margin: 0;\">{}</pre></div>",
                hex(self.background()),
                body
            )
        };

        if !options.line_numbers {
            return Ok(block);
        }

        let line_count = code.lines().count().max(1);
        let numbers = (1..=line_count)
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let numbers_style = if options.css_classes {
            String::new()
        } else {
            format!(
                " style=\"line-height: 125%; margin: 0; color: {};\"",
                hex(self.gutter_foreground())
            )
        };

        Ok(format!(
            "<table class=\"highlighttable\"><tr><td class=\"linenos\"><div class=\"linenodiv\"><pre{}>{}</pre></div></td><td class=\"code\">{}</td></tr></table>",
            numbers_style, numbers, block
        ))
    }

    /// CSS class 模式需要的樣式表
    pub fn stylesheet(&self) -> Result<String> {
        css_for_theme_with_class_style(self.theme, CLASS_STYLE)
            .with_context(|| format!("Failed to generate CSS for theme '{}'", self.theme_name))
    }

    fn inline_body(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut highlighter = HighlightLines::new(syntax, self.theme);
        let mut output = String::with_capacity(code.len() * 4);

        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &SYNTAX_SET)
                .with_context(|| format!("Failed to highlight line: {}", line.trim_end()))?;
            output.push_str(&styled_line_to_highlighted_html(&ranges, IncludeBackground::No)?);
        }

        Ok(output)
    }

    fn classed_body(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .with_context(|| format!("Failed to highlight line: {}", line.trim_end()))?;
        }
        Ok(generator.finalize())
    }

    fn background(&self) -> Color {
        self.theme.settings.background.unwrap_or(Color::WHITE)
    }

    fn gutter_foreground(&self) -> Color {
        self.theme.settings.gutter_foreground.unwrap_or(Color {
            r: 0x99,
            g: 0x99,
            b: 0x99,
            a: 0xff,
        })
    }
}

/// 去除前後空白並確保以換行結尾
fn prepare_code(code: &str) -> String {
    let mut code = code.trim().to_string();
    code.push('\n');
    code
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}
