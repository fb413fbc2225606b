//! Data models for seeds, rotation state, extraction results, and posts.
//!
//! The seed file, rotation state, and front-matter structs use camelCase
//! field names because those are the on-disk wire formats (`seeds.json`,
//! `state.json`, and the front-matter consumed by the static-site build),
//! hence the `#[allow(non_snake_case)]` attributes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One candidate source link for the pipeline.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Seed {
    /// Product page URL to crawl and link to.
    pub link: String,
    /// Primary SEO keyword woven into the generated article.
    #[serde(default)]
    pub primaryKeyword: String,
}

/// The seed file: ordered links plus generation defaults shared by all of
/// them. Order matters; rotation walks the list front to back.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedFile {
    #[serde(default)]
    pub items: Vec<Seed>,
    /// Language the articles are written in.
    #[serde(default = "default_language")]
    pub language: String,
    /// Audience description woven into the prompt.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Tone of voice for the articles.
    #[serde(default = "default_tone")]
    pub tone: String,
    /// Tags stamped onto every generated post.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

impl Default for SeedFile {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            language: default_language(),
            audience: default_audience(),
            tone: default_tone(),
            tags: default_tags(),
        }
    }
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

pub(crate) fn default_audience() -> String {
    "general consumers".to_string()
}

pub(crate) fn default_tone() -> String {
    "friendly".to_string()
}

pub(crate) fn default_tags() -> Vec<String> {
    vec!["review".to_string(), "affiliate".to_string()]
}

/// Which seed indexes have been consumed in the current rotation cycle.
///
/// Indexes are appended in pick order, so the vector doubles as a history.
/// Stale indexes left behind by a shrunk seed list are harmless; they simply
/// never match again and disappear at the next reset.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RotationState {
    #[serde(default)]
    pub usedIndexes: Vec<usize>,
}

/// What the extractor pulled out of a source page. Transient; never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub description: String,
    /// May be empty or relative; the hero download validates it.
    pub hero_image_url: String,
    /// Whitespace-collapsed, capped body text for the prompt.
    pub body_text: String,
}

/// Everything the generator needs for one post, assembled either from a seed
/// plus the seed-file defaults or from explicit CLI flags.
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub link: String,
    pub primary_keyword: String,
    pub language: String,
    pub audience: String,
    pub tone: String,
    pub tags: Vec<String>,
}

impl PostRequest {
    /// Combine one seed with the file-level generation defaults.
    pub fn from_seed(file: &SeedFile, seed: &Seed) -> Self {
        Self {
            link: seed.link.clone(),
            primary_keyword: seed.primaryKeyword.clone(),
            language: file.language.clone(),
            audience: file.audience.clone(),
            tone: file.tone.clone(),
            tags: file.tags.clone(),
        }
    }
}

/// Front-matter of a content file. Field names are the wire format the
/// static-site build reads; do not rename them.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrontMatter {
    pub title: String,
    pub description: String,
    /// ISO-8601 timestamp with milliseconds, UTC.
    pub pubDate: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Web path of the hero image; empty only in hand-written files.
    #[serde(default)]
    pub image: String,
    /// Web path of the social-share image; absent when composition failed.
    #[serde(default)]
    pub ogImage: Option<String>,
}

/// Destination area for a generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    Publish,
    Draft,
}

impl PublishMode {
    /// Subdirectory of the content root this mode writes into.
    pub fn content_subdir(&self) -> &'static str {
        match self {
            Self::Publish => "blog",
            Self::Draft => "drafts",
        }
    }
}

/// Summary of a successful run, reported by the orchestrator.
#[derive(Debug, Clone)]
pub struct CreatedPost {
    pub slug: String,
    pub path: PathBuf,
    pub category: String,
    /// Web path written into `image` front-matter (downloaded or placeholder).
    pub hero_image: String,
    /// Web path written into `ogImage`, when composition succeeded.
    pub social_image: Option<String>,
}
