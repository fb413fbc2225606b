//! Error types for the post-generation pipeline.
//!
//! One enum covers every failure mode of a run. The variants mirror the
//! pipeline's failure policy: configuration, fetch, generation, and write
//! errors abort the run and leave rotation state untouched so the same seed
//! is retried on the next trigger; image errors are soft and only downgrade
//! the post.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AutopostError>;

/// All failure modes of a pipeline run.
#[derive(Debug, Error)]
pub enum AutopostError {
    /// Missing credential or unusable configuration. Fatal before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The source page could not be fetched (transport error or non-success
    /// status).
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The text-generation service errored or returned an unusable response.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Image generation or composition failed. Recovered inside the run; the
    /// post is written without the affected image.
    #[error("image step failed: {0}")]
    SoftImage(String),

    /// A filesystem operation failed (content file, image file, state file,
    /// or feed output).
    #[error("filesystem error at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AutopostError {
    /// Process exit code for the top-level dispatcher, distinct per kind so a
    /// scheduler can tell a missing credential from a flaky source site.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Fetch { .. } => 3,
            Self::Generation(_) => 4,
            Self::Write { .. } => 5,
            Self::SoftImage(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_fetch_error() -> AutopostError {
        // An invalid URL makes the request builder fail without any network.
        let source = reqwest::Client::new().get("http://").build().unwrap_err();
        AutopostError::Fetch {
            url: "http://".to_string(),
            source,
        }
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = vec![
            AutopostError::Configuration("missing key".into()),
            sample_fetch_error(),
            AutopostError::Generation("boom".into()),
            AutopostError::Write {
                path: PathBuf::from("/tmp/x"),
                source: std::io::Error::other("disk full"),
            },
            AutopostError::SoftImage("no font".into()),
        ];

        let codes: HashSet<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_fetch_error_mentions_url() {
        let message = sample_fetch_error().to_string();
        assert!(message.contains("http://"));
        assert!(message.starts_with("fetch failed"));
    }

    #[test]
    fn test_write_error_mentions_path() {
        let err = AutopostError::Write {
            path: PathBuf::from("/var/blog/post.md"),
            source: std::io::Error::other("read-only filesystem"),
        };
        assert!(err.to_string().contains("/var/blog/post.md"));
    }
}
