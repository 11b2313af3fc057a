//! Destination naming: chapter title -> collision-free output path.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of suffix attempts when resolving path collisions
const MAX_SUFFIX_ATTEMPTS: u32 = 9999;

/// Extension appended to every chapter file
const CHAPTER_EXTENSION: &str = "txt";

/// Characters that are illegal in filesystem names on at least one supported
/// platform; each is replaced with an underscore.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace filesystem-illegal characters in a title with underscores.
///
/// # Examples
///
/// ```
/// use chapter_dl::naming::sanitize_title;
///
/// assert_eq!(sanitize_title("A/B:C"), "A_B_C");
/// assert_eq!(sanitize_title("Chapter One"), "Chapter One");
/// ```
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Resolve a collision-free destination path for a chapter title.
///
/// The sanitized title becomes `<title>.txt` under `dir`; if `exists` reports
/// that path as taken, numeric suffixes `_1`, `_2`, ... are spliced in before
/// the extension until a free path is found.
///
/// The returned path is guaranteed free of collisions with paths that existed
/// at call time only. The probe and the caller's later write are not atomic:
/// two workers resolving the same title concurrently can both be handed the
/// same path, and one write can shadow the other.
///
/// # Errors
///
/// Returns [`Error::Naming`] if no free path is found within
/// `MAX_SUFFIX_ATTEMPTS` suffixes.
pub fn resolve_destination<F>(dir: &Path, title: &str, exists: F) -> Result<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let stem = sanitize_title(title);
    let candidate = dir.join(format!("{stem}.{CHAPTER_EXTENSION}"));
    if !exists(&candidate) {
        return Ok(candidate);
    }

    for i in 1..=MAX_SUFFIX_ATTEMPTS {
        let candidate = dir.join(format!("{stem}_{i}.{CHAPTER_EXTENSION}"));
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::Naming {
        title: title.to_string(),
        reason: format!("no free name after {MAX_SUFFIX_ATTEMPTS} attempts"),
    })
}

/// [`resolve_destination`] with the existence check backed by the real
/// filesystem.
pub fn resolve_in_dir(dir: &Path, title: &str) -> Result<PathBuf> {
    resolve_destination(dir, title, |path| path.exists())
}
