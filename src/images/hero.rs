//! Hero image download with placeholder fallback.

use crate::config::{Config, HERO_IMAGE_SUBDIR};
use crate::error::{AutopostError, Result};
use tokio::fs;
use tracing::{debug, instrument, warn};
use url::Url;

/// Extensions kept as-is; anything else is saved as jpg.
const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Where a post's hero image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroSource {
    /// Downloaded from the source page.
    Downloaded,
    /// The configured placeholder, used when there was no usable URL or the
    /// download failed.
    Placeholder,
}

/// Outcome of the hero branch; always usable, never an error.
#[derive(Debug, Clone)]
pub struct HeroImage {
    /// Web path that goes into the `image` front-matter field.
    pub web_path: String,
    pub source: HeroSource,
}

/// Download the extracted hero image, or fall back to the placeholder.
///
/// Only absolute HTTP(S) URLs are attempted; relative references on the
/// source page are skipped outright. Failures are logged here and reduced to
/// the placeholder, so callers always get a usable path.
#[instrument(level = "info", skip_all, fields(slug = %slug))]
pub async fn fetch_hero_image(
    http: &reqwest::Client,
    cfg: &Config,
    hero_url: &str,
    slug: &str,
) -> HeroImage {
    if !is_absolute_http(hero_url) {
        debug!(url = %hero_url, "no absolute hero image URL; using placeholder");
        return placeholder(cfg);
    }

    match download(http, cfg, hero_url, slug).await {
        Ok(web_path) => HeroImage {
            web_path,
            source: HeroSource::Downloaded,
        },
        Err(e) => {
            warn!(url = %hero_url, error = %e, "hero image download failed; using placeholder");
            placeholder(cfg)
        }
    }
}

fn placeholder(cfg: &Config) -> HeroImage {
    HeroImage {
        web_path: cfg.placeholder_image.clone(),
        source: HeroSource::Placeholder,
    }
}

async fn download(
    http: &reqwest::Client,
    cfg: &Config,
    hero_url: &str,
    slug: &str,
) -> Result<String> {
    let fetch_err = |e: reqwest::Error| AutopostError::Fetch {
        url: hero_url.to_string(),
        source: e,
    };

    let response = http.get(hero_url).send().await.map_err(fetch_err)?;
    let bytes = response
        .error_for_status()
        .map_err(fetch_err)?
        .bytes()
        .await
        .map_err(fetch_err)?;

    let dir = cfg.hero_image_dir();
    fs::create_dir_all(&dir).await.map_err(|e| AutopostError::Write {
        path: dir.clone(),
        source: e,
    })?;

    let file_name = format!("{slug}.{}", image_extension(hero_url));
    let path = dir.join(&file_name);
    fs::write(&path, &bytes).await.map_err(|e| AutopostError::Write {
        path: path.clone(),
        source: e,
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "hero image saved");
    Ok(format!("/{HERO_IMAGE_SUBDIR}/{file_name}"))
}

/// Guess the file extension from the URL: text after the last dot with any
/// query string stripped, lowercased, checked against the allow-list.
fn image_extension(url: &str) -> &'static str {
    let tail = url
        .rsplit('.')
        .next()
        .and_then(|t| t.split('?').next())
        .unwrap_or("")
        .to_ascii_lowercase();

    ALLOWED_EXTENSIONS
        .iter()
        .find(|ext| **ext == tail)
        .copied()
        .unwrap_or("jpg")
}

fn is_absolute_http(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
