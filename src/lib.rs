//! codecard - 將語法高亮的程式碼貼進抽認卡欄位

pub mod clipboard;
pub mod config;
pub mod editor;
pub mod highlight;
pub mod host;
pub mod language;
pub mod source;
pub mod store;
pub mod utils;

// 重新導出常用類型
pub use config::{Preference, Settings};
pub use editor::Editor;
pub use highlight::{HighlightEngine, HighlightOptions};
pub use language::{get_default_language, set_default_language, LanguageCatalog};
pub use store::{sync_config_with_default, ConfStore};
