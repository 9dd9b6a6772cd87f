//! Print a single article

use anyhow::Result;
use std::future::Future;

use crate::content::{ArticleSession, LoadOutcome};
use crate::i18n::Language;
use crate::Site;

/// Load an article and print it, as Markdown or rendered HTML
pub async fn run(site: &Site, slug: &str, lang: Option<&str>, html: bool) -> Result<()> {
    let lang = Language::negotiate(lang, None, site.default_language());
    let session = ArticleSession::new(site.content_loader());

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let view = match open_until(&session, lang, slug, interrupt).await {
        LoadOutcome::Loaded(view) => view,
        LoadOutcome::NotFound => anyhow::bail!("Article not found: {} ({})", slug, lang),
        LoadOutcome::Cancelled => anyhow::bail!("Cancelled loading {}", slug),
    };

    let markdown = view.article.to_markdown();
    if html {
        print!("{}", site.renderer().render(&markdown));
    } else {
        if let Some(author) = view.meta.as_ref().and_then(|m| m.author.as_deref()) {
            println!("by {}\n", author);
        }
        println!("{}", markdown);
    }

    Ok(())
}

/// Open `slug`, closing the session if `interrupt` resolves first
async fn open_until<F: Future>(
    session: &ArticleSession,
    lang: Language,
    slug: &str,
    interrupt: F,
) -> LoadOutcome {
    let open = session.open(lang, slug);
    tokio::pin!(open);
    tokio::select! {
        biased;
        outcome = &mut open => outcome,
        _ = interrupt => {
            session.close().await;
            open.await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentLoader, ContentSource};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct DelayedSource(Duration);

    #[async_trait]
    impl ContentSource for DelayedSource {
        async fn fetch(&self, path: &str) -> crate::Result<String> {
            if path.ends_with("manifest.json") {
                return Ok("[]".to_string());
            }
            tokio::time::sleep(self.0).await;
            Ok("# Title\nbody".to_string())
        }

        fn describe(&self) -> String {
            "delayed".to_string()
        }
    }

    fn session(delay: Duration) -> ArticleSession {
        ArticleSession::new(ContentLoader::new(Arc::new(DelayedSource(delay))))
    }

    #[tokio::test]
    async fn test_interrupt_cancels_load() {
        let session = session(Duration::from_millis(500));
        let interrupt = tokio::time::sleep(Duration::from_millis(20));
        let outcome = open_until(&session, Language::En, "slow", interrupt).await;
        assert_eq!(outcome, LoadOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_load_finishes_without_interrupt() {
        let session = session(Duration::from_millis(5));
        let outcome =
            open_until(&session, Language::En, "quick", std::future::pending::<()>()).await;
        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
    }
}
