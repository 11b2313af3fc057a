//! Text statistics for downloaded chapter files.

use crate::error::Result;
use std::path::Path;

/// Character/word/line statistics for one text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStats {
    /// All characters, including whitespace
    pub total_chars: usize,
    /// Characters excluding all whitespace
    pub effective_chars: usize,
    /// CJK ideographs (U+4E00..=U+9FFF)
    pub cjk_chars: usize,
    /// ASCII letters
    pub ascii_letters: usize,
    /// ASCII digits
    pub digit_chars: usize,
    /// Whitespace-separated words containing at least one ASCII letter
    pub ascii_words: usize,
    /// All lines
    pub total_lines: usize,
    /// Lines with non-whitespace content
    pub non_empty_lines: usize,
    /// File size in bytes
    pub file_size: u64,
    /// Encoding label the file decoded with
    pub encoding: &'static str,
}

/// Decode file bytes, trying UTF-8 first and then the legacy Chinese
/// encodings the source site historically served.
fn decode(bytes: &[u8]) -> (String, &'static str) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "utf-8");
    }
    for label in ["gbk", "gb2312"] {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (text, _, had_errors) = encoding.decode(bytes);
            if !had_errors {
                return (text.into_owned(), label);
            }
        }
    }
    (String::from_utf8_lossy(bytes).into_owned(), "utf-8 (lossy)")
}

/// Analyze a text file.
pub fn analyze_file(path: &Path) -> Result<TextStats> {
    let bytes = std::fs::read(path)?;
    let file_size = bytes.len() as u64;
    let (content, encoding) = decode(&bytes);
    Ok(analyze(&content, file_size, encoding))
}

fn analyze(content: &str, file_size: u64, encoding: &'static str) -> TextStats {
    let mut total_chars = 0;
    let mut cjk_chars = 0;
    let mut ascii_letters = 0;
    let mut digit_chars = 0;
    let mut effective_chars = 0;
    for c in content.chars() {
        total_chars += 1;
        if !c.is_whitespace() {
            effective_chars += 1;
        }
        if ('\u{4e00}'..='\u{9fff}').contains(&c) {
            cjk_chars += 1;
        }
        if c.is_ascii_alphabetic() {
            ascii_letters += 1;
        }
        if c.is_ascii_digit() {
            digit_chars += 1;
        }
    }

    let ascii_words = content
        .split_whitespace()
        .filter(|word| word.chars().any(|c| c.is_ascii_alphabetic()))
        .count();

    let total_lines = content.split('\n').count();
    let non_empty_lines = content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .count();

    TextStats {
        total_chars,
        effective_chars,
        cjk_chars,
        ascii_letters,
        digit_chars,
        ascii_words,
        total_lines,
        non_empty_lines,
        file_size,
        encoding,
    }
}

impl std::fmt::Display for TextStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "encoding:          {}", self.encoding)?;
        writeln!(f, "total chars:       {}", self.total_chars)?;
        writeln!(f, "effective chars:   {}", self.effective_chars)?;
        writeln!(f, "CJK chars:         {}", self.cjk_chars)?;
        writeln!(f, "ascii letters:     {}", self.ascii_letters)?;
        writeln!(f, "digits:            {}", self.digit_chars)?;
        writeln!(f, "ascii words:       {}", self.ascii_words)?;
        writeln!(f, "lines:             {}", self.total_lines)?;
        writeln!(f, "non-empty lines:   {}", self.non_empty_lines)?;
        write!(f, "file size:         {} bytes", self.file_size)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_mixed_content() {
        let stats = analyze("萧炎 said hello 42\n\nsecond line", 0, "utf-8");
        assert_eq!(stats.cjk_chars, 2);
        assert_eq!(stats.ascii_letters, 19);
        assert_eq!(stats.digit_chars, 2);
        assert_eq!(stats.ascii_words, 4);
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.non_empty_lines, 2);
        // 4 spaces + 2 newlines of whitespace
        assert_eq!(stats.effective_chars, stats.total_chars - 6);
    }

    #[test]
    fn reads_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapter.txt");
        std::fs::write(&path, "斗气大陆，没有魔法。").unwrap();

        let stats = analyze_file(&path).unwrap();
        assert_eq!(stats.encoding, "utf-8");
        assert_eq!(stats.cjk_chars, 8);
    }

    #[test]
    fn falls_back_to_gbk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.txt");
        let (bytes, _, _) = encoding_rs::GBK.encode("三十年河东，三十年河西");
        std::fs::write(&path, &bytes).unwrap();

        let stats = analyze_file(&path).unwrap();
        assert_eq!(stats.encoding, "gbk");
        assert_eq!(stats.cjk_chars, 10);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(analyze_file(Path::new("/no/such/file.txt")).is_err());
    }
}
