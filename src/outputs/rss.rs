//! RSS 2.0 feed of the newest published posts.

use super::{PostEntry, post_url, scan_published_posts, to_io, write_text_element};
use crate::config::Config;
use crate::error::{AutopostError, Result};
use crate::utils::{collapse_whitespace, truncate_chars};
use chrono::DateTime;
use itertools::Itertools;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Feed readers only care about recent entries; older posts stay reachable
/// through the sitemap.
pub const FEED_ITEM_LIMIT: usize = 20;

/// Summary length when a post has no description of its own.
const SUMMARY_MAX_CHARS: usize = 150;

/// Scan the published tree and write `public/rss.xml`.
#[instrument(level = "info", skip_all)]
pub async fn export_rss(cfg: &Config) -> Result<PathBuf> {
    let posts = scan_published_posts(cfg).await;
    let path = cfg.public_dir.join("rss.xml");

    let xml = build_rss(cfg, &posts).map_err(|e| AutopostError::Write {
        path: path.clone(),
        source: e,
    })?;

    fs::create_dir_all(&cfg.public_dir)
        .await
        .map_err(|e| AutopostError::Write {
            path: cfg.public_dir.clone(),
            source: e,
        })?;
    fs::write(&path, xml).await.map_err(|e| AutopostError::Write {
        path: path.clone(),
        source: e,
    })?;

    info!(path = %path.display(), items = posts.len().min(FEED_ITEM_LIMIT), "rss feed written");
    Ok(path)
}

/// Render the feed document. Items are newest-first by `pubDate` and capped
/// at [`FEED_ITEM_LIMIT`].
fn build_rss(cfg: &Config, posts: &[PostEntry]) -> std::io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(to_io)?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss_start)).map_err(to_io)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(to_io)?;
    write_text_element(&mut writer, "title", &cfg.site_title)?;
    write_text_element(&mut writer, "link", &cfg.site_url)?;
    write_text_element(&mut writer, "description", &cfg.site_description)?;

    let newest_first = posts
        .iter()
        .sorted_by(|a, b| b.front_matter.pubDate.cmp(&a.front_matter.pubDate))
        .take(FEED_ITEM_LIMIT);

    for post in newest_first {
        let link = post_url(cfg, &post.slug);
        writer
            .write_event(Event::Start(BytesStart::new("item")))
            .map_err(to_io)?;
        write_text_element(&mut writer, "title", &post.front_matter.title)?;
        write_text_element(&mut writer, "link", &link)?;
        write_text_element(&mut writer, "guid", &link)?;
        write_text_element(&mut writer, "description", &item_summary(post))?;
        write_text_element(
            &mut writer,
            "pubDate",
            &rfc2822_date(&post.front_matter.pubDate),
        )?;
        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .map_err(to_io)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(to_io)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .map_err(to_io)?;

    String::from_utf8(writer.into_inner()).map_err(to_io)
}

/// Front-matter description when present, else the start of the body.
fn item_summary(post: &PostEntry) -> String {
    if !post.front_matter.description.is_empty() {
        return post.front_matter.description.clone();
    }
    let flat = collapse_whitespace(&post.body);
    if flat.chars().count() <= SUMMARY_MAX_CHARS {
        flat
    } else {
        format!("{}...", truncate_chars(&flat, SUMMARY_MAX_CHARS))
    }
}

/// RSS wants RFC-2822 dates; front-matter stores RFC-3339. Unparseable values
/// pass through untouched.
fn rfc2822_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_rfc2822())
        .unwrap_or_else(|_| raw.to_string())
}
