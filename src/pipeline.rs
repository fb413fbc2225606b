//! Run orchestration, from seed selection to a content file on disk.
//!
//! One run produces at most one post. The rotation state is only advanced
//! after the whole post exists, so a failed run leaves the seed eligible for
//! the next attempt. Image steps never fail a run: the hero degrades to the
//! configured placeholder and the social card is simply skipped.

use crate::api::Generation;
use crate::config::Config;
use crate::error::Result;
use crate::extractor::PageSource;
use crate::generator::generate_article;
use crate::images::{HeroSource, compose_social_image, fetch_hero_image};
use crate::models::{CreatedPost, FrontMatter, PostRequest, PublishMode};
use crate::seeds::{load_seed_file, load_state, mark_used, pick_next_seed};
use crate::utils::slugify;
use crate::writer::{detect_category, write_post};
use chrono::{SecondsFormat, Utc};
use tracing::{info, instrument, warn};

/// Execute one scheduled run: pick the next seed, create its post, then mark
/// the seed as used. `Ok(None)` means the seed list was empty and nothing
/// happened.
#[instrument(level = "info", skip_all, fields(mode = ?mode))]
pub async fn run_once(
    cfg: &Config,
    http: &reqwest::Client,
    pages: &impl PageSource,
    llm: &impl Generation,
    mode: PublishMode,
) -> Result<Option<CreatedPost>> {
    let seeds = load_seed_file(&cfg.seeds_path).await;
    let mut state = load_state(&cfg.state_path).await;

    let Some(index) = pick_next_seed(&seeds, &mut state, &cfg.state_path).await? else {
        info!("seed list is empty; nothing to post");
        return Ok(None);
    };

    let request = PostRequest::from_seed(&seeds, &seeds.items[index]);
    info!(index, link = %request.link, "processing seed");

    let post = create_post(cfg, http, pages, llm, &request, mode).await?;
    mark_used(&mut state, index, &cfg.state_path).await?;

    Ok(Some(post))
}

/// Create one post from a single request: extract the source page, generate
/// the article, resolve both images, and write the content file.
///
/// Also the entry point for ad-hoc posts (`add`), which bypass the rotation.
#[instrument(level = "info", skip_all, fields(link = %request.link))]
pub async fn create_post(
    cfg: &Config,
    http: &reqwest::Client,
    pages: &impl PageSource,
    llm: &impl Generation,
    request: &PostRequest,
    mode: PublishMode,
) -> Result<CreatedPost> {
    let page = pages.extract(&request.link).await?;

    // a seed without a keyword targets whatever the page calls itself
    let mut request = request.clone();
    if request.primary_keyword.is_empty() {
        request.primary_keyword = page.title.clone();
    }

    let article = generate_article(llm, &page, &request).await?;

    let slug = slugify(&page.title);
    let category = detect_category(&page.title, &request.link, &request.primary_keyword);

    let hero = fetch_hero_image(http, cfg, &page.hero_image_url, &slug).await;
    if hero.source == HeroSource::Placeholder {
        info!(image = %hero.web_path, "using placeholder hero image");
    }

    let social_image = match compose_social_image(llm, cfg, &page.title, &slug).await {
        Ok(Some(path)) => Some(path),
        Ok(None) => {
            info!("image service returned no background; skipping social card");
            None
        }
        Err(e) => {
            warn!(error = %e, "social card failed; publishing without one");
            None
        }
    };

    let description = if page.description.is_empty() {
        format!("Review {}", page.title)
    } else {
        page.description.clone()
    };

    let fm = FrontMatter {
        title: page.title.clone(),
        description,
        pubDate: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        category: category.to_string(),
        tags: request.tags.clone(),
        image: hero.web_path.clone(),
        ogImage: social_image.clone(),
    };

    let path = write_post(cfg, &slug, &fm, &article, mode).await?;
    info!(slug = %slug, category, path = %path.display(), "post created");

    Ok(CreatedPost {
        slug,
        path,
        category: category.to_string(),
        hero_image: hero.web_path,
        social_image,
    })
}
