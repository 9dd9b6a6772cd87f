//! casa-rs: listing search and bilingual blog engine for a real-estate
//! marketplace site
//!
//! The crate has two independent cores: the [`listing`] search engine, which
//! filters an immutable in-memory collection, and the [`content`] loader,
//! which fetches blog manifests and Markdown articles and renders them.
//! [`server`] exposes both over HTTP.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod i18n;
pub mod listing;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{ContentLoader, ContentSource, FsSource, HttpSource, MarkdownRenderer};
use i18n::{I18n, Language};
use listing::ListingCollection;

/// The site: configuration plus the directories it resolves to
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Local content root (manifests and articles)
    pub content_dir: PathBuf,
    /// Translation overrides
    pub locales_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site from an already-built configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let locales_dir = base_dir.join(&config.locales_dir);
        Self {
            config,
            base_dir,
            content_dir,
            locales_dir,
        }
    }

    /// Configured default language (unknown codes fall back to English)
    pub fn default_language(&self) -> Language {
        Language::resolve(&self.config.language)
    }

    /// The listing collection: the configured file, or the built-in seed
    pub fn listings(&self) -> Result<ListingCollection> {
        match &self.config.listings_file {
            Some(file) => ListingCollection::load(self.base_dir.join(file)),
            None => ListingCollection::seed(),
        }
    }

    /// Content source: remote when `content_url` is set, local otherwise
    pub fn content_source(&self) -> Arc<dyn ContentSource> {
        match &self.config.content_url {
            Some(url) => {
                tracing::debug!("Using remote content root {}", url);
                Arc::new(HttpSource::new(url.clone()))
            }
            None => Arc::new(FsSource::new(self.content_dir.clone())),
        }
    }

    /// Loader over the configured content source
    pub fn content_loader(&self) -> ContentLoader {
        ContentLoader::new(self.content_source())
    }

    /// Markdown renderer with the configured highlighting and styles
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(&self.config.highlight, &self.config.styles)
    }

    /// Built-in translations overlaid with `locales/` from the base directory
    pub fn i18n(&self) -> Result<I18n> {
        let mut i18n = I18n::builtin()?;
        i18n.load_languages(&self.locales_dir)?;
        Ok(i18n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_site_defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.default_language(), Language::En);
        assert_eq!(site.content_dir, dir.path().join("content"));
        assert!(!site.listings().unwrap().is_empty());
    }

    #[test]
    fn test_site_reads_config_and_listings_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "language: es\nlistings_file: data/mine.json\ncontent_dir: posts\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/mine.json"), "[]").unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.default_language(), Language::Es);
        assert_eq!(site.content_dir, dir.path().join("posts"));
        assert!(site.listings().unwrap().is_empty());
    }
}
