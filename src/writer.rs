//! Content file assembly: category detection, front-matter, and the
//! date-partitioned write.

use crate::config::Config;
use crate::error::{AutopostError, Result};
use crate::models::{FrontMatter, PublishMode};
use chrono::{Datelike, Local};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Category when no rule matches.
pub const DEFAULT_CATEGORY: &str = "general";

/// Ordered category rules; the first match wins. Patterns run over the
/// lowercased title + URL + keyword haystack as plain substring matches, so
/// short tokens ("ai", "pc") also hit inside larger words; mind that when
/// adding rules, and keep broader categories below narrower ones.
static CATEGORY_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"ai|artificial intelligence|chatbot|llm|machine learning", "ai"),
        (r"laptop|pc|computer|notebook", "laptop"),
        (r"headphone|earbud|audio|speaker", "audio"),
        (r"camera|lens|dslr|mirrorless", "camera"),
        (r"phone|smartphone|android|iphone", "smartphone"),
        (r"home|cook|kitchen|appliance|vacuum", "home"),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).unwrap(), category))
    .collect()
});

/// Classify a post by keyword-matching title, link, and primary keyword in
/// fixed priority order.
pub fn detect_category(title: &str, link: &str, keyword: &str) -> &'static str {
    let haystack = format!("{title} {link} {keyword}").to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(&haystack))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Escape a string for a double-quoted YAML scalar.
fn escape_double_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the front-matter block, `---` fences included.
///
/// The key set and order are the wire format the static-site build consumes.
/// `image` and `ogImage` lines are omitted when there is nothing to point at.
pub fn render_front_matter(fm: &FrontMatter) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_double_quoted(&fm.title)));
    out.push_str(&format!(
        "description: \"{}\"\n",
        escape_double_quoted(&fm.description)
    ));
    out.push_str(&format!("pubDate: \"{}\"\n", fm.pubDate));
    out.push_str(&format!("category: \"{}\"\n", fm.category));

    let tags = fm
        .tags
        .iter()
        .map(|tag| format!("\"{}\"", escape_double_quoted(tag)))
        .join(", ");
    out.push_str(&format!("tags: [{tags}]\n"));

    if !fm.image.is_empty() {
        out.push_str(&format!("image: \"{}\"\n", escape_double_quoted(&fm.image)));
    }
    if let Some(og) = &fm.ogImage {
        out.push_str(&format!("ogImage: \"{}\"\n", escape_double_quoted(og)));
    }
    out.push_str("---\n");
    out
}

/// Full content file: front-matter, a blank line, the article, a trailing
/// newline.
pub fn render_post(fm: &FrontMatter, article: &str) -> String {
    format!("{}\n{}\n", render_front_matter(fm), article.trim_end())
}

/// Split a content file back into front-matter and body. `None` when the
/// front-matter fences or YAML are broken.
pub fn parse_post(text: &str) -> Option<(FrontMatter, String)> {
    let rest = text.strip_prefix("---\n")?;
    let (head, body) = rest.split_once("\n---\n")?;
    let fm = serde_yaml::from_str(head).ok()?;
    Some((fm, body.trim_start_matches('\n').to_string()))
}

/// Write one post under the mode's content root, partitioned by the current
/// local year and month. An existing file with the same slug is overwritten
/// silently; reruns are expected to win.
#[instrument(level = "info", skip_all, fields(slug = %slug, mode = ?mode))]
pub async fn write_post(
    cfg: &Config,
    slug: &str,
    fm: &FrontMatter,
    article: &str,
    mode: PublishMode,
) -> Result<PathBuf> {
    let now = Local::now();
    let dir = cfg
        .content_dir
        .join(mode.content_subdir())
        .join(format!("{:04}", now.year()))
        .join(format!("{:02}", now.month()));

    fs::create_dir_all(&dir).await.map_err(|e| AutopostError::Write {
        path: dir.clone(),
        source: e,
    })?;

    let path = dir.join(format!("{slug}.md"));
    fs::write(&path, render_post(fm, article))
        .await
        .map_err(|e| AutopostError::Write {
            path: path.clone(),
            source: e,
        })?;

    info!(path = %path.display(), "content file written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_front_matter() -> FrontMatter {
        FrontMatter {
            title: "Widget 9000 Pro".to_string(),
            description: "Review Widget 9000 Pro".to_string(),
            pubDate: "2026-08-25T09:00:00.000Z".to_string(),
            category: "general".to_string(),
            tags: vec!["review".to_string(), "affiliate".to_string()],
            image: "/images/blog/widget-9000-pro.jpg".to_string(),
            ogImage: Some("/images/og/widget-9000-pro.png".to_string()),
        }
    }

    #[test]
    fn test_category_priority_ai_beats_laptop() {
        assert_eq!(detect_category("Best AI Laptop 2026", "", ""), "ai");
    }

    #[test]
    fn test_category_buckets() {
        assert_eq!(
            detect_category("Sony WH-1000XM6 headphone deep dive", "", ""),
            "audio"
        );
        assert_eq!(detect_category("Fuji mirrorless body", "", ""), "camera");
        assert_eq!(detect_category("Galaxy smartphone", "", ""), "smartphone");
        assert_eq!(detect_category("Robot vacuum for pet hair", "", ""), "home");
        assert_eq!(detect_category("ThinkBook notebook", "", ""), "laptop");
    }

    #[test]
    fn test_category_considers_link_and_keyword() {
        assert_eq!(
            detect_category("Great device", "https://shop.example/iphone-17", ""),
            "smartphone"
        );
        assert_eq!(
            detect_category("Great device", "https://shop.example/x", "kitchen scale"),
            "home"
        );
    }

    #[test]
    fn test_category_defaults_to_general() {
        assert_eq!(
            detect_category("Widget 9000 Pro", "https://shop.example/widget-9000", ""),
            DEFAULT_CATEGORY
        );
    }

    #[test]
    fn test_front_matter_round_trip() {
        let fm = sample_front_matter();
        let rendered = render_post(&fm, "# Widget 9000 Pro\n\nBody text.");

        let (parsed, body) = parse_post(&rendered).unwrap();
        assert_eq!(parsed, fm);
        assert_eq!(body, "# Widget 9000 Pro\n\nBody text.\n");
    }

    #[test]
    fn test_front_matter_escapes_embedded_quotes() {
        let mut fm = sample_front_matter();
        fm.title = r#"The "best" widget \ ever"#.to_string();

        let rendered = render_front_matter(&fm);
        assert!(rendered.contains(r#"title: "The \"best\" widget \\ ever""#));

        let (parsed, _) = parse_post(&render_post(&fm, "body")).unwrap();
        assert_eq!(parsed.title, r#"The "best" widget \ ever"#);
    }

    #[test]
    fn test_front_matter_omits_og_image_when_absent() {
        let mut fm = sample_front_matter();
        fm.ogImage = None;

        let rendered = render_front_matter(&fm);
        assert!(!rendered.contains("ogImage"));

        let (parsed, _) = parse_post(&render_post(&fm, "body")).unwrap();
        assert_eq!(parsed.ogImage, None);
    }

    #[test]
    fn test_parse_post_rejects_broken_fences() {
        assert!(parse_post("no front matter here").is_none());
        assert!(parse_post("---\ntitle: \"x\"\nnever closed").is_none());
    }

    #[tokio::test]
    async fn test_write_post_partitions_by_year_month_and_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.content_dir = dir.path().join("content");

        let fm = sample_front_matter();
        let published = write_post(&cfg, "widget-9000-pro", &fm, "# Post", PublishMode::Publish)
            .await
            .unwrap();
        let draft = write_post(&cfg, "widget-9000-pro", &fm, "# Post", PublishMode::Draft)
            .await
            .unwrap();

        let now = Local::now();
        let partition = format!("{:04}/{:02}/widget-9000-pro.md", now.year(), now.month());
        assert!(published.ends_with(format!("blog/{partition}")));
        assert!(draft.ends_with(format!("drafts/{partition}")));
        assert!(published.exists());
    }

    #[tokio::test]
    async fn test_write_post_overwrites_existing_slug() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.content_dir = dir.path().join("content");
        let fm = sample_front_matter();

        write_post(&cfg, "widget", &fm, "first version", PublishMode::Publish)
            .await
            .unwrap();
        let path = write_post(&cfg, "widget", &fm, "second version", PublishMode::Publish)
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("second version"));
        assert!(!text.contains("first version"));
    }
}
