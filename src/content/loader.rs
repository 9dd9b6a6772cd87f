//! Content loader - fetches manifests and articles from a content source

use serde::Serialize;
use std::sync::Arc;

use super::source::{article_path, manifest_path};
use super::{find_post, Article, ContentSource, Post};
use crate::i18n::Language;
use crate::{Error, Result};

/// An article together with its manifest metadata, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleView {
    pub slug: String,
    pub meta: Option<Post>,
    pub article: Article,
}

/// Loads blog manifests and articles for a language
#[derive(Clone)]
pub struct ContentLoader {
    source: Arc<dyn ContentSource>,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Load the post manifest for `lang`.
    ///
    /// Failures are logged and recovered as an empty manifest.
    pub async fn load_manifest(&self, lang: Language) -> Vec<Post> {
        let path = manifest_path(lang);
        let text = match self.source.fetch(&path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "Failed to load manifest {} from {}: {}",
                    path,
                    self.source.describe(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Post>>(&text) {
            Ok(posts) => {
                tracing::debug!("Loaded {} posts for {}", posts.len(), lang);
                posts
            }
            Err(e) => {
                tracing::warn!("Malformed manifest {}: {}", path, e);
                Vec::new()
            }
        }
    }

    /// Load and split one article.
    ///
    /// Every failure, including an unsafe slug, is reported as
    /// [`Error::NotFound`] so callers can send the reader back to the index.
    pub async fn load_article(&self, lang: Language, slug: &str) -> Result<Article> {
        if !is_valid_slug(slug) {
            tracing::debug!("Rejecting article slug {:?}", slug);
            return Err(Error::not_found(slug));
        }

        let path = article_path(lang, slug);
        match self.source.fetch(&path).await {
            Ok(text) => Ok(Article::parse(&text)),
            Err(e) => {
                tracing::info!("Article {} unavailable: {}", path, e);
                Err(Error::not_found(slug))
            }
        }
    }

    /// Manifest first, then the article, one after the other
    pub async fn load_view(&self, lang: Language, slug: &str) -> Result<ArticleView> {
        let manifest = self.load_manifest(lang).await;
        let article = self.load_article(lang, slug).await?;
        Ok(ArticleView {
            slug: slug.to_string(),
            meta: find_post(&manifest, slug).cloned(),
            article,
        })
    }
}

/// Slugs double as path segments, so only already-slugified values pass
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug::slugify(slug) == slug
}
