//! Feed exports built from the published content tree.
//!
//! Both exporters re-read what the pipeline wrote instead of keeping a
//! separate index, so posts added or removed by hand are picked up too.
//!
//! # Submodules
//!
//! - [`rss`]: RSS 2.0 feed of the newest published posts
//! - [`sitemap`]: sitemap with one entry per post plus the site root
//!
//! # Input Structure
//!
//! ```text
//! content_dir/blog/
//! ├── 2026/
//! │   ├── 08/
//! │   │   ├── widget-9000-pro.md
//! │   │   └── tai-nghe-chong-on.md
//! │   └── 09/
//! │       └── robot-vacuum-x2.md
//! ```

pub mod rss;
pub mod sitemap;

use crate::config::Config;
use crate::models::FrontMatter;
use crate::writer::parse_post;
use futures::stream::{self, StreamExt};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// One published post, parsed back from disk.
#[derive(Debug, Clone)]
pub struct PostEntry {
    /// File stem, which is also the public URL slug.
    pub slug: String,
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Collect every published post under `content_dir/blog`.
///
/// A missing directory yields an empty list; unreadable files and files with
/// broken front-matter are logged and skipped, never fatal.
pub async fn scan_published_posts(cfg: &Config) -> Vec<PostEntry> {
    let blog_dir = cfg.content_dir.join("blog");
    if !blog_dir.is_dir() {
        debug!(dir = %blog_dir.display(), "no published posts yet");
        return Vec::new();
    }

    let files = collect_markdown_files(&blog_dir).await;
    let posts: Vec<PostEntry> = stream::iter(files)
        .then(|path| async move {
            match fs::read_to_string(&path).await {
                Ok(text) => match parse_post(&text) {
                    Some((front_matter, body)) => Some(PostEntry {
                        slug: path
                            .file_stem()
                            .map(|stem| stem.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        front_matter,
                        body,
                    }),
                    None => {
                        warn!(path = %path.display(), "skipping post with broken front-matter");
                        None
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable post");
                    None
                }
            }
        })
        .filter_map(|post| async move { post })
        .collect()
        .await;

    info!(count = posts.len(), "scanned published posts");
    posts
}

/// Walk the year/month partitions and return every `.md` path, sorted for
/// deterministic output.
async fn collect_markdown_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match entry.file_type().await {
                Ok(kind) if kind.is_dir() => stack.push(path),
                Ok(_) if path.extension().is_some_and(|ext| ext == "md") => files.push(path),
                _ => {}
            }
        }
    }

    files.sort();
    files
}

/// Public URL of a published post.
fn post_url(cfg: &Config, slug: &str) -> String {
    format!("{}/blog/{slug}", cfg.site_url.trim_end_matches('/'))
}

/// Flatten any writer error into `io::Error`; the exporter wraps it with the
/// target path.
fn to_io<E: std::fmt::Display>(e: E) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

/// `<name>text</name>`, with XML escaping left to the writer.
fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> std::io::Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(to_io)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(to_io)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(to_io)?;
    Ok(())
}
