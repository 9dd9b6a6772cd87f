//! Content sources - where manifests and article documents come from

use async_trait::async_trait;
use std::path::PathBuf;

use crate::i18n::Language;
use crate::{Error, Result};

/// Path of a language manifest, relative to the content root
pub fn manifest_path(lang: Language) -> String {
    format!("blog/{}/manifest.json", lang.code())
}

/// Path of an article document, relative to the content root
pub fn article_path(lang: Language, slug: &str) -> String {
    format!("blog/{}/{}.md", lang.code(), slug)
}

/// A read-only store of text resources addressed by relative path
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a resource. A missing resource is [`Error::NotFound`].
    async fn fetch(&self, path: &str) -> Result<String>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Content root on the local filesystem
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found(full.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Content root served over HTTP
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::not_found(url));
        }
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_resource_paths() {
        assert_eq!(manifest_path(Language::Es), "blog/es/manifest.json");
        assert_eq!(
            article_path(Language::En, "buying-guide"),
            "blog/en/buying-guide.md"
        );
    }

    #[tokio::test]
    async fn test_fs_source_reads_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("blog/en")).unwrap();
        std::fs::write(dir.path().join("blog/en/a.md"), "hello").unwrap();

        let source = FsSource::new(dir.path());
        assert_eq!(source.fetch("blog/en/a.md").await.unwrap(), "hello");
        let err = source.fetch("blog/en/b.md").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_http_source_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/blog/en/manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/content/blog/en/broken.md"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = HttpSource::new(format!("{}/content/", server.uri()));
        assert_eq!(
            source.fetch("blog/en/manifest.json").await.unwrap(),
            "[]"
        );

        // unmatched requests get wiremock's default 404
        let missing = source.fetch("blog/en/missing.md").await.unwrap_err();
        assert!(missing.is_not_found());

        let broken = source.fetch("blog/en/broken.md").await.unwrap_err();
        assert!(matches!(broken, Error::Status { status: 500, .. }));
    }
}
