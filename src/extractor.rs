//! Source-page extraction.
//!
//! Fetches a product page and pulls out the handful of fields the prompt and
//! the front-matter need. No site-specific contract is assumed; everything
//! comes from standard meta tags with fixed fallback chains:
//!
//! - title: `og:title` → `<title>` → [`DEFAULT_TITLE`]
//! - description: `meta[name=description]` → `og:description` → empty
//! - hero image: `og:image` → first `<img src>` → empty
//! - body text: `<body>` text, whitespace-collapsed, capped at
//!   [`BODY_TEXT_MAX_CHARS`]

use crate::error::{AutopostError, Result};
use crate::models::ExtractedPage;
use crate::utils::{collapse_whitespace, truncate_chars};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Cap on extracted body text; bounds the downstream prompt.
pub const BODY_TEXT_MAX_CHARS: usize = 5000;

/// Title used when a page exposes neither a social-preview title nor a
/// `<title>` tag.
pub const DEFAULT_TITLE: &str = "Untitled product";

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static TITLE_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static FIRST_IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Where source pages come from. The pipeline only needs [`extract`];
/// the seam lets tests feed canned pages instead of the network.
///
/// [`extract`]: PageSource::extract
pub trait PageSource {
    /// Fetch and dissect one page. A transport failure or non-success status
    /// is a hard [`AutopostError::Fetch`]; there are no retries.
    async fn extract(&self, url: &str) -> Result<ExtractedPage>;
}

/// Live extractor backed by a shared reqwest client (User-Agent and timeout
/// come from the client's builder).
pub struct HttpExtractor {
    client: reqwest::Client,
}

impl HttpExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpExtractor {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> Result<ExtractedPage> {
        let fetch_err = |e: reqwest::Error| AutopostError::Fetch {
            url: url.to_string(),
            source: e,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let response = response.error_for_status().map_err(fetch_err)?;
        let html = response.text().await.map_err(fetch_err)?;

        let page = parse_page(&html);
        debug!(
            title = %page.title,
            hero = %page.hero_image_url,
            body_chars = page.body_text.chars().count(),
            "extracted source page"
        );
        Ok(page)
    }
}

/// Pure HTML dissection, separated from the fetch so it can run on fixtures.
fn parse_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = meta_content(&document, &OG_TITLE)
        .or_else(|| {
            document
                .select(&TITLE_TAG)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let description = meta_content(&document, &META_DESCRIPTION)
        .or_else(|| meta_content(&document, &OG_DESCRIPTION))
        .unwrap_or_default();

    let hero_image_url = meta_content(&document, &OG_IMAGE)
        .or_else(|| {
            document
                .select(&FIRST_IMG)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_default();

    let body_text = document
        .select(&BODY)
        .next()
        .map(|el| {
            let raw = el.text().collect::<Vec<_>>().join(" ");
            truncate_chars(&collapse_whitespace(&raw), BODY_TEXT_MAX_CHARS)
        })
        .unwrap_or_default();

    ExtractedPage {
        title,
        description,
        hero_image_url,
        body_text,
    }
}

/// First `content` attribute for the selector, trimmed; empty counts as
/// absent so the fallback chain keeps going.
fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
