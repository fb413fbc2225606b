//! Command-line interface definitions for the autopost tool.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. The API key is read from the environment rather than a positional
//! value so it stays out of shell history.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the key for the text and image endpoints.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Command-line arguments for the autopost application.
///
/// Without a subcommand the binary prints a short usage notice and exits
/// cleanly, so a misconfigured scheduler entry stays harmless.
///
/// # Examples
///
/// ```sh
/// # Scheduled run: publish a post for the next unused seed
/// autopost publish
///
/// # Same pipeline, but the file lands under drafts for review
/// autopost draft
///
/// # One ad-hoc post outside the seed rotation
/// autopost add https://shop.example/widget-9000 --keyword "widget 9000"
///
/// # Rebuild the feeds after editing posts by hand
/// autopost export-rss && autopost export-sitemap
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to the YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key for the OpenAI-compatible endpoints
    #[arg(long, env = "OPENAI_API_KEY", global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What a single invocation does.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick the next unused seed and publish one post
    Publish,
    /// Pick the next unused seed and write the post under drafts
    Draft,
    /// Create one post from an explicit link, leaving the rotation untouched
    Add(AddArgs),
    /// Regenerate public/rss.xml from the published posts
    ExportRss,
    /// Regenerate public/sitemap.xml from the published posts
    ExportSitemap,
}

/// Arguments for the `add` subcommand. Flag defaults mirror the seed-file
/// generation defaults.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Product or review page to write about
    pub link: String,

    /// Primary SEO keyword; defaults to the extracted page title
    #[arg(long)]
    pub keyword: Option<String>,

    /// Language the article is written in
    #[arg(long, default_value_t = crate::models::default_language())]
    pub lang: String,

    /// Audience the article addresses
    #[arg(long, default_value_t = crate::models::default_audience())]
    pub audience: String,

    /// Tone of voice for the article
    #[arg(long, default_value_t = crate::models::default_tone())]
    pub tone: String,

    /// Front-matter tags, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = crate::models::default_tags())]
    pub tags: Vec<String>,

    /// Write the post under drafts instead of publishing it
    #[arg(long)]
    pub draft: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_bare_invocation() {
        let cli = Cli::parse_from(["autopost"]);

        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parses_publish_with_config() {
        let cli = Cli::parse_from(["autopost", "--config", "./site.yaml", "publish"]);

        assert_eq!(cli.config, Some(PathBuf::from("./site.yaml")));
        assert!(matches!(cli.command, Some(Command::Publish)));
    }

    #[test]
    fn test_cli_accepts_config_after_the_subcommand() {
        let cli = Cli::parse_from(["autopost", "publish", "--config", "custom.yaml"]);

        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert!(matches!(cli.command, Some(Command::Publish)));
    }

    #[test]
    fn test_cli_parses_add_defaults() {
        let cli = Cli::parse_from(["autopost", "add", "https://shop.example/widget-9000"]);

        let Some(Command::Add(args)) = cli.command else {
            panic!("expected add subcommand");
        };
        assert_eq!(args.link, "https://shop.example/widget-9000");
        assert_eq!(args.keyword, None);
        assert_eq!(args.lang, "en");
        assert_eq!(args.audience, "general consumers");
        assert_eq!(args.tone, "friendly");
        assert_eq!(args.tags, vec!["review", "affiliate"]);
        assert!(!args.draft);
    }

    #[test]
    fn test_cli_parses_add_overrides() {
        let cli = Cli::parse_from([
            "autopost",
            "add",
            "https://shop.example/tai-nghe",
            "--keyword",
            "tai nghe chống ồn",
            "--lang",
            "vi",
            "--tags",
            "review,audio",
            "--draft",
        ]);

        let Some(Command::Add(args)) = cli.command else {
            panic!("expected add subcommand");
        };
        assert_eq!(args.keyword.as_deref(), Some("tai nghe chống ồn"));
        assert_eq!(args.lang, "vi");
        assert_eq!(args.tags, vec!["review", "audio"]);
        assert!(args.draft);
    }

    #[test]
    fn test_cli_parses_exporters() {
        assert!(matches!(
            Cli::parse_from(["autopost", "export-rss"]).command,
            Some(Command::ExportRss)
        ));
        assert!(matches!(
            Cli::parse_from(["autopost", "export-sitemap"]).command,
            Some(Command::ExportSitemap)
        ));
    }
}
