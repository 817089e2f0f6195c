// 讀取要高亮的程式碼（檔案或標準輸入）

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use std::fs;
use std::io::Read;
use std::path::Path;

/// 解析編碼名稱（例如 "utf-8", "big5", "gbk", "shift_jis"）
pub fn parse_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .with_context(|| format!("Unknown encoding '{}'", label))
}

/// 檢測編碼，基於 BOM
fn detect_bom(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((encoding_rs::UTF_8, 3))
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Some((encoding_rs::UTF_16LE, 2))
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Some((encoding_rs::UTF_16BE, 2))
    } else {
        None
    }
}

/// 將位元組解碼為字串
///
/// 有 BOM 時以 BOM 為準，否則使用指定編碼（預設 UTF-8）
pub fn decode(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    let (encoding, bom_length) =
        detect_bom(bytes).unwrap_or((encoding.unwrap_or(encoding_rs::UTF_8), 0));

    let (decoded, _, had_errors) = encoding.decode(&bytes[bom_length..]);
    if had_errors {
        log::warn!("Encoding errors detected while decoding as {}", encoding.name());
    }
    decoded.into_owned()
}

/// 讀取檔案，`-` 代表標準輸入
pub fn read_text(path: &Path, encoding: Option<&'static Encoding>) -> Result<String> {
    let bytes = if path == Path::new("-") {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
        bytes
    } else {
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?
    };
    Ok(decode(&bytes, encoding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_utf8_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'x', b'=', b'1'];
        assert_eq!(decode(&bytes, None), "x=1");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let bytes = [0xFF, 0xFE, b'a', 0x00, b'b', 0x00];
        assert_eq!(decode(&bytes, Some(encoding_rs::GBK)), "ab");
    }

    #[test]
    fn test_decode_with_label() {
        let big5 = parse_encoding("big5").unwrap();
        let (bytes, _, _) = big5.encode("中文");
        assert_eq!(decode(&bytes, Some(big5)), "中文");
    }

    #[test]
    fn test_unknown_encoding() {
        assert!(parse_encoding("no-such-encoding").is_err());
    }

    #[test]
    fn test_read_text_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "print('hi')\n").unwrap();
        assert_eq!(read_text(file.path(), None).unwrap(), "print('hi')\n");
    }
}
