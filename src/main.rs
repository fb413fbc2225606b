//! # autopost
//!
//! An affiliate review pipeline that turns a rotating list of product links
//! into published blog posts: it extracts each product page, writes an
//! SEO-shaped review through an OpenAI-compatible API, resolves a hero image
//! and a social-share card, and drops a Markdown file with front-matter into
//! a static site's content tree.
//!
//! ## Features
//!
//! - Round-robin seed rotation with persisted state, so every link is used
//!   once before any repeats
//! - Page extraction with meta-tag fallback chains (og:title, og:description,
//!   og:image, first inline image)
//! - SEO-structured article generation (AIDA intro, pros/cons, comparison and
//!   specification tables, call to action)
//! - Hero image download with placeholder fallback, plus a composed 1200x630
//!   social-share card with a gradient and title overlay
//! - RSS and sitemap exporters rebuilt from the published content tree
//!
//! ## Usage
//!
//! ```sh
//! # scheduled run: publish a post for the next unused seed
//! autopost publish
//!
//! # one ad-hoc post outside the rotation
//! autopost add https://shop.example/widget-9000 --keyword "widget 9000"
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Selection**: Pick the next unused seed from the rotation state
//! 2. **Extraction**: Download the product page and dissect its metadata
//! 3. **Generation**: Ask the text model for the article Markdown
//! 4. **Images**: Resolve the hero image and compose the social card
//! 5. **Output**: Write the front-matter + article under the content tree

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod extractor;
mod generator;
mod images;
mod models;
mod outputs;
mod pipeline;
mod seeds;
mod utils;
mod writer;

use api::OpenAiClient;
use cli::{API_KEY_ENV, AddArgs, Cli, Command};
use config::Config;
use error::{AutopostError, Result};
use extractor::HttpExtractor;
use models::{PostRequest, PublishMode};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> ExitCode {
    // --- Tracing init ---
    // Logs go to stderr; stdout stays clean for the usage notice.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("autopost starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let code = match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, exit_code = e.exit_code(), "Run failed");
            ExitCode::from(e.exit_code())
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    code
}

/// Dispatch one invocation. Everything that can fail funnels through here so
/// `main` can map the error onto its exit code.
async fn run(args: Cli) -> Result<()> {
    let Some(command) = args.command else {
        // schedulers sometimes fire with an empty argument list; stay harmless
        println!(
            "autopost: nothing to do. Subcommands: publish, draft, add <LINK>, export-rss, export-sitemap."
        );
        return Ok(());
    };

    let cfg = Config::load(args.config.as_deref()).await?;

    match command {
        Command::Publish => trigger_run(&cfg, args.api_key, PublishMode::Publish).await,
        Command::Draft => trigger_run(&cfg, args.api_key, PublishMode::Draft).await,
        Command::Add(add) => add_post(&cfg, args.api_key, add).await,
        Command::ExportRss => outputs::rss::export_rss(&cfg).await.map(|_| ()),
        Command::ExportSitemap => outputs::sitemap::export_sitemap(&cfg).await.map(|_| ()),
    }
}

/// Build the shared HTTP client and both API-facing services.
fn build_services(
    cfg: &Config,
    api_key: Option<String>,
) -> Result<(reqwest::Client, HttpExtractor, OpenAiClient)> {
    let api_key = api_key
        .ok_or_else(|| AutopostError::Configuration(format!("no API key; set {API_KEY_ENV}")))?;

    let http = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(std::time::Duration::from_secs(cfg.http_timeout_secs))
        .build()
        .map_err(|e| AutopostError::Configuration(format!("could not build HTTP client: {e}")))?;

    let extractor = HttpExtractor::new(http.clone());
    let llm = OpenAiClient::new(cfg, api_key)?;
    Ok((http, extractor, llm))
}

/// Probe the content tree before touching any API.
async fn ensure_content_tree(cfg: &Config) -> Result<()> {
    if let Err(e) = ensure_writable_dir(&cfg.content_dir).await {
        error!(
            path = %cfg.content_dir.display(),
            error = %e,
            "Content directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }
    Ok(())
}

/// One scheduled run in the given mode.
async fn trigger_run(cfg: &Config, api_key: Option<String>, mode: PublishMode) -> Result<()> {
    let (http, extractor, llm) = build_services(cfg, api_key)?;
    ensure_content_tree(cfg).await?;

    if let Some(post) = pipeline::run_once(cfg, &http, &extractor, &llm, mode).await? {
        info!(slug = %post.slug, path = %post.path.display(), "Run complete");
    }
    Ok(())
}

/// One ad-hoc post from an explicit link; the seed rotation is not consulted
/// and not advanced.
async fn add_post(cfg: &Config, api_key: Option<String>, add: AddArgs) -> Result<()> {
    let (http, extractor, llm) = build_services(cfg, api_key)?;
    ensure_content_tree(cfg).await?;

    let mode = if add.draft {
        PublishMode::Draft
    } else {
        PublishMode::Publish
    };
    let request = PostRequest {
        link: add.link,
        primary_keyword: add.keyword.unwrap_or_default(),
        language: add.lang,
        audience: add.audience,
        tone: add.tone,
        tags: add.tags,
    };

    let post = pipeline::create_post(cfg, &http, &extractor, &llm, &request, mode).await?;
    info!(slug = %post.slug, path = %post.path.display(), "Ad-hoc post created");
    Ok(())
}
