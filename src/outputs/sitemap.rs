//! Sitemap covering the site root and every published post.

use super::{PostEntry, post_url, scan_published_posts, to_io, write_text_element};
use crate::config::Config;
use crate::error::{AutopostError, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Scan the published tree and write `public/sitemap.xml`.
#[instrument(level = "info", skip_all)]
pub async fn export_sitemap(cfg: &Config) -> Result<PathBuf> {
    let posts = scan_published_posts(cfg).await;
    let path = cfg.public_dir.join("sitemap.xml");

    let xml = build_sitemap(cfg, &posts).map_err(|e| AutopostError::Write {
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

    info!(path = %path.display(), urls = posts.len() + 1, "sitemap written");
    Ok(path)
}

fn build_sitemap(cfg: &Config, posts: &[PostEntry]) -> std::io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(to_io)?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_XMLNS));
    writer.write_event(Event::Start(urlset)).map_err(to_io)?;

    writer
        .write_event(Event::Start(BytesStart::new("url")))
        .map_err(to_io)?;
    write_text_element(&mut writer, "loc", &cfg.site_url)?;
    writer
        .write_event(Event::End(BytesEnd::new("url")))
        .map_err(to_io)?;

    for post in posts {
        writer
            .write_event(Event::Start(BytesStart::new("url")))
            .map_err(to_io)?;
        write_text_element(&mut writer, "loc", &post_url(cfg, &post.slug))?;
        write_text_element(
            &mut writer,
            "lastmod",
            last_modified(&post.front_matter.pubDate),
        )?;
        writer
            .write_event(Event::End(BytesEnd::new("url")))
            .map_err(to_io)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("urlset")))
        .map_err(to_io)?;

    String::from_utf8(writer.into_inner()).map_err(to_io)
}

/// Sitemaps take a plain date; the time half of the RFC-3339 stamp is noise.
fn last_modified(pub_date: &str) -> &str {
    pub_date.split('T').next().unwrap_or(pub_date)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{front_matter, test_config, write_published};
    use super::*;

    fn entry(slug: &str, pub_date: &str) -> PostEntry {
        PostEntry {
            slug: slug.to_string(),
            front_matter: front_matter(slug, pub_date),
            body: String::new(),
        }
    }

    #[test]
    fn test_sitemap_lists_root_and_every_post() {
        let mut cfg = Config::default();
        cfg.site_url = "https://reviews.example".to_string();
        let posts = vec![
            entry("widget-9000-pro", "2026-08-25T09:00:00.000Z"),
            entry("robot-vacuum-x2", "2026-07-10T09:00:00.000Z"),
        ];

        let xml = build_sitemap(&cfg, &posts).unwrap();

        assert!(xml.contains(&format!("<urlset xmlns=\"{SITEMAP_XMLNS}\">")));
        assert!(xml.contains("<loc>https://reviews.example</loc>"));
        assert!(xml.contains("<loc>https://reviews.example/blog/widget-9000-pro</loc>"));
        assert!(xml.contains("<loc>https://reviews.example/blog/robot-vacuum-x2</loc>"));
        assert_eq!(xml.matches("<url>").count(), 3);
    }

    #[test]
    fn test_lastmod_keeps_only_the_date() {
        let cfg = Config::default();
        let posts = vec![entry("a-post", "2026-08-25T09:30:00.000Z")];

        let xml = build_sitemap(&cfg, &posts).unwrap();

        assert!(xml.contains("<lastmod>2026-08-25</lastmod>"));
        assert!(!xml.contains("09:30"));
    }

    #[test]
    fn test_dateless_pub_date_passes_through() {
        assert_eq!(last_modified("unknown"), "unknown");
    }

    #[tokio::test]
    async fn test_export_writes_sitemap_under_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_published(
            &cfg,
            "widget-9000-pro",
            &front_matter("Widget 9000 Pro", "2026-08-01T09:00:00.000Z"),
        )
        .await;

        let path = export_sitemap(&cfg).await.unwrap();

        assert_eq!(path, cfg.public_dir.join("sitemap.xml"));
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("/blog/widget-9000-pro"));
        assert!(xml.contains("<lastmod>2026-08-01</lastmod>"));
    }
}
