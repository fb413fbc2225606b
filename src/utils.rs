//! String and filesystem helpers used across the pipeline.
//!
//! - Slug derivation for file and image names
//! - Whitespace collapsing and character-safe truncation for extracted text
//! - A writable-directory probe run before any network work

use crate::error::{AutopostError, Result};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};
use unicode_normalization::UnicodeNormalization;

/// Slug used when a title produces no alphanumeric characters at all.
pub const FALLBACK_SLUG: &str = "untitled-post";

/// Maximum slug length in characters.
pub const SLUG_MAX_CHARS: usize = 80;

/// Derive a URL-safe slug from a title.
///
/// Lowercases, strips diacritics (NFD decomposition with combining marks
/// removed), collapses every non-alphanumeric run into a single hyphen,
/// trims leading/trailing hyphens, and caps the result at
/// [`SLUG_MAX_CHARS`]. An empty result yields [`FALLBACK_SLUG`].
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Tai Nghe Chống Ồn"), "tai-nghe-chong-on");
/// assert_eq!(slugify("Widget 9000 Pro"), "widget-9000-pro");
/// ```
pub fn slugify(title: &str) -> String {
    let decomposed: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    let mut slug = String::with_capacity(decomposed.len());
    let mut pending_hyphen = false;
    for c in decomposed.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug.truncate(SLUG_MAX_CHARS);
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Collapse all whitespace runs (including newlines) into single spaces and
/// trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a create-and-delete
/// of a scratch file. Run before any network work so a permissions problem
/// surfaces immediately instead of after a paid generation call.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await.map_err(|e| AutopostError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    let probe = path.join("..__probe_write__");
    match stdfs::File::create(&probe) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe);
            debug!("output directory is writable");
            Ok(())
        }
        Err(e) => Err(AutopostError::Write {
            path: probe,
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Widget 9000 Pro"), "widget-9000-pro");
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_strips_diacritics() {
        assert_eq!(slugify("Café Au Lait"), "cafe-au-lait");
        assert_eq!(slugify("Tai Nghe Chống Ồn"), "tai-nghe-chong-on");
    }

    #[test]
    fn test_slugify_case_and_diacritics_fold_together() {
        assert_eq!(slugify("CRÈME BRÛLÉE"), slugify("creme brulee"));
    }

    #[test]
    fn test_slugify_idempotent() {
        let once = slugify("Máy Lọc Không Khí 2026!");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn test_slugify_trims_hyphens() {
        assert_eq!(slugify("--- Widget ---"), "widget");
        assert_eq!(slugify("!!!Widget???Pro!!!"), "widget-pro");
    }

    #[test]
    fn test_slugify_fallback_on_no_alphanumerics() {
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("💻📱"), FALLBACK_SLUG);
    }

    #[test]
    fn test_slugify_caps_length() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.chars().count() <= SLUG_MAX_CHARS);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\n b\tc  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("điện thoại", 4), "điện");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
