//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::listing::DEFAULT_PRICE_CEILING;
use crate::Result;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,

    // Language
    pub language: String,
    pub languages: Vec<String>,

    // Content
    pub content_dir: String,
    /// Remote content root; when set, blog resources are fetched over HTTP
    pub content_url: Option<String>,
    pub locales_dir: String,
    pub blog_index: String,

    // Listings
    pub listings_file: Option<String>,
    pub price_ceiling: u64,
    pub recent_limit: usize,
    pub latest_posts: usize,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub styles: StyleConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Homezuela".to_string(),
            description: "Homes for sale and rent in Venezuela".to_string(),
            url: "http://localhost:4000".to_string(),

            language: "en".to_string(),
            languages: vec!["en".to_string(), "es".to_string()],

            content_dir: "content".to_string(),
            content_url: None,
            locales_dir: "locales".to_string(),
            blog_index: "/blog".to_string(),

            listings_file: None,
            price_ceiling: DEFAULT_PRICE_CEILING,
            recent_limit: 4,
            latest_posts: 3,

            highlight: HighlightConfig::default(),
            styles: StyleConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.price_ceiling == 0 {
            return Err(crate::Error::config("price_ceiling must be greater than zero"));
        }
        validate_blog_index(&self.blog_index)
    }
}

/// Paths the server routes itself; the blog may not sit on or under them
const RESERVED_PATHS: &[&str] = &["/buy", "/api", "/content"];

/// `blog_index` becomes both a route and the `{blog_index}/:slug` prefix
fn validate_blog_index(index: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(crate::Error::config(format!(
            "blog_index {:?} {}",
            index, reason
        )))
    };

    if !index.starts_with('/') {
        return invalid("must be an absolute path");
    }
    if index == "/" || index.ends_with('/') {
        return invalid("must not be the root or end with '/'");
    }
    if index[1..].split('/').any(|segment| {
        segment.is_empty()
            || segment
                .chars()
                .any(|c| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
    }) {
        return invalid("must be plain, non-empty path segments");
    }
    if let Some(reserved) = RESERVED_PATHS
        .iter()
        .find(|r| index == **r || index.starts_with(&format!("{}/", r)))
    {
        return invalid(&format!("collides with the {} route", reserved));
    }
    Ok(())
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Class names attached to rendered article blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub blockquote: String,
    pub code_block: String,
    pub inline_code: String,
    pub table_wrapper: String,
    pub table: String,
    pub table_head_cell: String,
    pub table_cell: String,
    pub link: String,
    pub image: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            h1: "article-h1".to_string(),
            h2: "article-h2".to_string(),
            h3: "article-h3".to_string(),
            blockquote: "article-quote".to_string(),
            code_block: "article-code-block".to_string(),
            inline_code: "article-code".to_string(),
            table_wrapper: "article-table-wrap".to_string(),
            table: "article-table".to_string(),
            table_head_cell: "article-th".to_string(),
            table_cell: "article-td".to_string(),
            link: "article-link".to_string(),
            image: "article-image".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.price_ceiling, 1_000_000);
        assert_eq!(config.blog_index, "/blog");
        assert!(config.content_url.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Casa Test
language: es
content_url: https://cdn.example.com
price_ceiling: 500000
styles:
  h2: big-heading
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Casa Test");
        assert_eq!(config.language, "es");
        assert_eq!(config.content_url.as_deref(), Some("https://cdn.example.com"));
        assert_eq!(config.price_ceiling, 500_000);
        assert_eq!(config.styles.h2, "big-heading");
        // untouched fields keep their defaults
        assert_eq!(config.styles.h1, "article-h1");
        assert_eq!(config.recent_limit, 4);
    }

    #[test]
    fn test_load_rejects_zero_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "price_ceiling: 0\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_load_rejects_relative_blog_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "blog_index: blog\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }

    #[test]
    fn test_blog_index_must_not_collide_with_routes() {
        for index in [
            "/",
            "/blog/",
            "//blog",
            "/blog//posts",
            "/:slug",
            "/blog/*rest",
            "/buy",
            "/api",
            "/api/listings",
            "/content",
            "/content/blog",
        ] {
            assert!(
                validate_blog_index(index).is_err(),
                "{:?} should be rejected",
                index
            );
        }

        for index in ["/blog", "/news/articles", "/buying-guides", "/apis"] {
            assert!(validate_blog_index(index).is_ok(), "{:?} should pass", index);
        }
    }

    #[test]
    fn test_load_rejects_root_blog_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "blog_index: /\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("blog_index"));
    }
}
