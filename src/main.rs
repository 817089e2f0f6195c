use anyhow::{Context, Result};
use clap::Parser;
use codecard::clipboard::{ClipboardManager, Selection};
use codecard::host::FixedDeck;
use codecard::source;
use codecard::utils;
use codecard::{ConfStore, Editor, HighlightEngine, Preference};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codecard")]
#[command(author = "wen")]
#[command(version)]
#[command(about = "Paste syntax-highlighted code into flashcard fields.")]
#[command(long_about = "
codecard - highlight code snippets as HTML for flashcard fields

The code to highlight comes from FILE (use - for stdin). Without FILE the
clipboard is used. The HTML fragment is printed to stdout, or written back to
the clipboard with --copy.

The language defaults to the last one chosen for the current deck (--deck),
or the last one chosen anywhere. Choosing a language with --lang remembers it.

OPTIONS (--set KEY=true|false):
  linenos              Line numbers
  centerfragments      Center code fragments
  cssclasses           Use CSS classes instead of inline styles
  defaultlangperdeck   Default to last language used per deck
")]
struct Args {
    /// File with the code to highlight (- for stdin, default: clipboard)
    file: Option<PathBuf>,

    /// Name of the current deck
    #[arg(short, long)]
    deck: Option<String>,

    /// Choose the language (remembered as the default)
    #[arg(short, long)]
    lang: Option<String>,

    /// Change an option, e.g. --set linenos=false
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_option)]
    options: Vec<(Preference, bool)>,

    /// Collection config file
    #[arg(long, value_name = "PATH")]
    collection: Option<PathBuf>,

    /// Syntax theme
    #[arg(long)]
    theme: Option<String>,

    /// Encoding of FILE (default: BOM detection, then UTF-8)
    #[arg(long)]
    encoding: Option<String>,

    /// Copy the HTML to the clipboard instead of printing it
    #[arg(long)]
    copy: bool,

    /// List available languages
    #[arg(long)]
    list_languages: bool,

    /// List available themes
    #[arg(long)]
    list_themes: bool,

    /// Print the current options
    #[arg(long)]
    show_options: bool,

    /// Print the stylesheet needed when cssclasses is enabled
    #[arg(long)]
    stylesheet: bool,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,
}

fn parse_option(s: &str) -> Result<(Preference, bool)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", s))?;
    let pref: Preference = key.trim().parse()?;
    let value: bool = value
        .trim()
        .parse()
        .with_context(|| format!("Expected true or false for {}", pref))?;
    Ok((pref, value))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日誌
    utils::init_logger(args.debug);

    let path = match &args.collection {
        Some(path) => path.clone(),
        None => ConfStore::default_path()?,
    };
    let mut store = ConfStore::load(&path)?;
    log::debug!("Using collection config {}", path.display());
    let decks = FixedDeck(args.deck.clone());

    let result = run(&args, &mut store, &decks);

    // 即使高亮失敗，也保存已同步的設定
    finish(result, store.save())
}

/// 合併執行與存檔的結果，兩者皆失敗時保留執行錯誤
fn finish(result: Result<()>, saved: Result<()>) -> Result<()> {
    match (result, saved) {
        (Err(e), Err(save_err)) => {
            log::error!("Failed to save collection config: {:#}", save_err);
            Err(e.context(format!("also failed to save collection config: {:#}", save_err)))
        }
        (result, saved) => result.and(saved),
    }
}

fn run(args: &Args, store: &mut ConfStore, decks: &FixedDeck) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    if !args.options.is_empty() {
        store.update_settings(|settings| {
            for (pref, value) in &args.options {
                settings.set(*pref, *value);
            }
        })?;
    }

    if args.list_themes {
        for theme in HighlightEngine::available_themes() {
            writeln!(stdout, "{}", theme)?;
        }
        return Ok(());
    }

    let engine = HighlightEngine::new(args.theme.as_deref())?;
    let mut editor = Editor::on_editor_ready(store, decks, engine)?;

    if let Some(lang) = &args.lang {
        editor.on_language_selected(store, decks, lang)?;
    }

    if args.show_options {
        let settings = store.settings()?;
        writeln!(stdout, "{}", serde_json::to_string_pretty(&settings)?)?;
        return Ok(());
    }

    if args.list_languages {
        for lang in editor.language_menu() {
            writeln!(stdout, "{}", lang)?;
        }
        return Ok(());
    }

    if args.stylesheet {
        write!(stdout, "{}", editor.engine().stylesheet()?)?;
        return Ok(());
    }

    // 只有選項或語言變更時不需要高亮
    if args.file.is_none() && (!args.options.is_empty() || args.lang.is_some()) {
        return Ok(());
    }

    let encoding = args
        .encoding
        .as_deref()
        .map(source::parse_encoding)
        .transpose()?;
    let text = args
        .file
        .as_deref()
        .map(|path| source::read_text(path, encoding))
        .transpose()?;

    let mut clipboard = ClipboardManager::new();

    let mut output = String::new();
    {
        let mut selection = Selection::new(text, &mut clipboard);
        editor.highlight_code(store, &mut selection, &mut output)?;
    }

    if args.copy {
        clipboard.set_html(&output)?;
        log::info!("Copied highlighted {} code to clipboard", editor.language());
    } else {
        writeln!(stdout, "{}", output)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_keeps_run_error_when_save_fails() {
        let err = finish(
            Err(anyhow::anyhow!("Nothing to highlight")),
            Err(anyhow::anyhow!("disk full")),
        )
        .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Nothing to highlight"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn test_finish_keeps_single_error() {
        let err = finish(Ok(()), Err(anyhow::anyhow!("disk full"))).unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let err = finish(Err(anyhow::anyhow!("bad")), Ok(())).unwrap_err();
        assert_eq!(err.to_string(), "bad");
        assert!(finish(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("linenos=false").unwrap(),
            (Preference::LineNumbers, false)
        );
        assert!(parse_option("linenos").is_err());
        assert!(parse_option("linenos=maybe").is_err());
    }
}
