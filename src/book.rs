//! Book assembly: concatenate downloaded chapter files into one document.
//!
//! Chapter files are ordered by the arabic number preceding the chapter
//! marker in their filename (`243章 ...` sorts as 243); files without a
//! parseable number sort last, in name order. Unreadable files are skipped
//! with a warning rather than failing the whole merge.

use crate::error::Result;
use regex::Regex;
use std::io::Write;
use std::path::Path;

/// Filename marker identifying a chapter file
const CHAPTER_MARKER: char = '章';

/// Extract the chapter number from a filename, or `u64::MAX` for files that
/// don't carry one (sorts them last).
fn chapter_number(pattern: &Regex, filename: &str) -> u64 {
    pattern
        .captures(filename)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(u64::MAX)
}

fn is_chapter_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains(CHAPTER_MARKER))
}

/// Merge every chapter file under `chapters_dir` into `output`, in chapter
/// order, under a `title` header. Returns the number of chapters merged.
pub fn compile_book(chapters_dir: &Path, output: &Path, title: &str) -> Result<usize> {
    let number_pattern = Regex::new(r"(\d+)章")?;

    let mut chapters: Vec<std::path::PathBuf> = std::fs::read_dir(chapters_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_chapter_file(path))
        .collect();
    chapters.sort_by(|a, b| {
        let name_a = a.file_name().map(|n| n.to_string_lossy().into_owned());
        let name_b = b.file_name().map(|n| n.to_string_lossy().into_owned());
        let num_a = chapter_number(&number_pattern, name_a.as_deref().unwrap_or(""));
        let num_b = chapter_number(&number_pattern, name_b.as_deref().unwrap_or(""));
        num_a.cmp(&num_b).then(name_a.cmp(&name_b))
    });

    tracing::info!(count = chapters.len(), "merging chapters");

    let mut out = std::io::BufWriter::new(std::fs::File::create(output)?);
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out)?;

    let mut merged = 0;
    for chapter in &chapters {
        let content = match std::fs::read_to_string(chapter) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %chapter.display(), error = %err, "skipping unreadable chapter");
                continue;
            }
        };
        let heading = chapter
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        writeln!(out, "\n{}", "=".repeat(5))?;
        writeln!(out, "{heading}")?;
        writeln!(out, "{}\n", "=".repeat(5))?;
        writeln!(out, "{}\n", content.trim())?;
        merged += 1;
    }
    out.flush()?;

    tracing::info!(merged, output = %output.display(), "book written");
    Ok(merged)
}
