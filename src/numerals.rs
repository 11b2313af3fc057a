//! Chapter-name normalization: Chinese chapter numerals to arabic digits.
//!
//! Downloaded chapter files carry headings like `第两百四十三章 击杀大斗师！`
//! (and the common scan typo `地...章` for `第...章`). Normalizing them to
//! `243章 击杀大斗师！.txt` gives the book assembler a sortable numeral
//! scheme.

use crate::error::Result;
use regex::Regex;
use std::path::Path;

/// Parse a Chinese numeral (possibly wrapped in `第...章`) into its value.
///
/// Handles the digits 零一二三四五六七八九 plus 两, the unit markers
/// 十/百/千/万, the zero-gap form (一百零五 = 105), and elided units
/// (十五 = 15, 百十五 = 115). A string that is already arabic digits parses
/// directly; anything unrecognized contributes nothing.
///
/// # Examples
///
/// ```
/// use chapter_dl::numerals::chinese_to_arabic;
///
/// assert_eq!(chinese_to_arabic("两百四十三"), 243);
/// assert_eq!(chinese_to_arabic("第一百零五章"), 105);
/// assert_eq!(chinese_to_arabic("九千九百九十九"), 9999);
/// ```
#[must_use]
pub fn chinese_to_arabic(input: &str) -> u64 {
    let stripped: String = input.chars().filter(|c| *c != '第' && *c != '章').collect();
    if stripped.is_empty() {
        return 0;
    }
    if stripped.chars().all(|c| c.is_ascii_digit()) {
        return stripped.parse().unwrap_or(0);
    }

    let mut result: u64 = 0;
    let mut section: u64 = 0;
    let mut current: u64 = 0;
    for c in stripped.chars() {
        if let Some(d) = digit_value(c) {
            // 零 resets the pending digit, skipping a power gap
            current = d;
        } else {
            match c {
                '十' => {
                    section += current.max(1) * 10;
                    current = 0;
                }
                '百' => {
                    section += current.max(1) * 100;
                    current = 0;
                }
                '千' => {
                    section += current.max(1) * 1000;
                    current = 0;
                }
                '万' => {
                    section += current;
                    current = 0;
                    result += section.max(1) * 10_000;
                    section = 0;
                }
                _ => {}
            }
        }
    }
    result + section + current
}

fn digit_value(c: char) -> Option<u64> {
    match c {
        '零' => Some(0),
        '一' => Some(1),
        '二' | '两' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

/// Match a `第X章` / `地X章` heading at the start of a filename, returning
/// the parsed chapter number and the remainder of the name.
#[must_use]
pub fn extract_chapter_heading(filename: &str) -> Option<(u64, String)> {
    // compiled per call: the rename pass runs once over a directory
    let pattern =
        Regex::new(r"^[第地]([零一二三四五六七八九十百千万两]+)章\s*(.*)$").ok()?;
    let captures = pattern.captures(filename)?;
    let number = chinese_to_arabic(&captures[1]);
    Some((number, captures[2].to_string()))
}

/// Outcome of one normalization pass over a chapter directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    /// Files renamed (or, in dry-run mode, that would be renamed)
    pub renamed: usize,
    /// Files skipped because the target name already exists or the rename
    /// failed
    pub skipped: usize,
    /// Chapter files examined
    pub total: usize,
}

/// Rename every `第X章`/`地X章` chapter file under `dir` to the arabic
/// scheme `X章 <rest>.txt`.
///
/// With `dry_run` set, nothing is touched; the report counts what a real pass
/// would do. Existing targets are never overwritten.
pub fn normalize_chapter_names(dir: &Path, dry_run: bool) -> Result<RenameReport> {
    let whitespace = Regex::new(r"\s+")?;
    let mut report = RenameReport::default();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "txt") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        report.total += 1;

        let Some((number, rest)) = extract_chapter_heading(stem) else {
            continue;
        };
        let new_stem = if rest.is_empty() {
            format!("{number}章")
        } else {
            format!("{number}章 {rest}")
        };
        let new_name = format!(
            "{}.txt",
            whitespace.replace_all(new_stem.trim(), " ")
        );
        if new_name == format!("{stem}.txt") {
            continue;
        }

        let target = dir.join(&new_name);
        if dry_run {
            tracing::info!(from = stem, to = %new_name, "would rename");
            report.renamed += 1;
            continue;
        }
        if target.exists() {
            tracing::warn!(from = stem, to = %new_name, "target exists, skipping");
            report.skipped += 1;
            continue;
        }
        match std::fs::rename(&path, &target) {
            Ok(()) => {
                tracing::info!(from = stem, to = %new_name, "renamed");
                report.renamed += 1;
            }
            Err(err) => {
                tracing::warn!(from = stem, error = %err, "rename failed");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_the_reference_table() {
        // expected values from the site's chapter headings
        let cases = [
            ("二", 2),
            ("五", 5),
            ("十", 10),
            ("十五", 15),
            ("二十", 20),
            ("二十三", 23),
            ("一百", 100),
            ("一百零五", 105),
            ("一百二十", 120),
            ("两百四十三", 243),
            ("两百八十八", 288),
            ("三百", 300),
            ("五百五十八", 558),
            ("六百零五", 605),
            ("八百二十八", 828),
            ("一千", 1000),
            ("一千四百零一", 1401),
            ("一千六百二十三", 1623),
            ("九千九百九十九", 9999),
        ];
        for (input, expected) in cases {
            assert_eq!(chinese_to_arabic(input), expected, "{input}");
        }
    }

    #[test]
    fn parses_elided_unit_forms() {
        assert_eq!(chinese_to_arabic("百十五"), 115);
        assert_eq!(chinese_to_arabic("一百一十五"), 115);
        assert_eq!(chinese_to_arabic("百零三"), 103);
        assert_eq!(chinese_to_arabic("一万两千"), 12_000);
    }

    #[test]
    fn passes_through_arabic_digits_and_wrappers() {
        assert_eq!(chinese_to_arabic("243"), 243);
        assert_eq!(chinese_to_arabic("第243章"), 243);
        assert_eq!(chinese_to_arabic(""), 0);
        assert_eq!(chinese_to_arabic("abc"), 0);
    }

    #[test]
    fn extracts_headings_including_the_scan_typo() {
        assert_eq!(
            extract_chapter_heading("第八百二十八章  分尸【第二更！】"),
            Some((828, "分尸【第二更！】".to_string()))
        );
        assert_eq!(
            extract_chapter_heading("地两百四十三章 击杀大斗师！"),
            Some((243, "击杀大斗师！".to_string()))
        );
        assert_eq!(extract_chapter_heading("243章 已经规整"), None);
        assert_eq!(extract_chapter_heading("readme"), None);
    }

    #[test]
    fn normalizes_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("第两百四十三章 击杀大斗师！.txt"), "a").unwrap();
        fs::write(dir.path().join("地十五章  双重空格.txt"), "b").unwrap();
        fs::write(dir.path().join("7章 已规整.txt"), "c").unwrap();

        let report = normalize_chapter_names(dir.path(), false).unwrap();
        assert_eq!(report.renamed, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.total, 3);

        assert!(dir.path().join("243章 击杀大斗师！.txt").exists());
        assert!(dir.path().join("15章 双重空格.txt").exists());
        assert!(dir.path().join("7章 已规整.txt").exists());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("第十五章 测试.txt"), "a").unwrap();

        let report = normalize_chapter_names(dir.path(), true).unwrap();
        assert_eq!(report.renamed, 1);
        assert!(dir.path().join("第十五章 测试.txt").exists());
        assert!(!dir.path().join("15章 测试.txt").exists());
    }

    #[test]
    fn existing_target_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("第五章 对手.txt"), "new").unwrap();
        fs::write(dir.path().join("5章 对手.txt"), "old").unwrap();

        let report = normalize_chapter_names(dir.path(), false).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("5章 对手.txt")).unwrap(),
            "old"
        );
    }
}
