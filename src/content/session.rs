//! Article view activations with explicit cancellation
//!
//! Loading an article moves through `Idle -> Loading -> {Loaded | NotFound}`.
//! Opening a new article on the same session cancels the load still in
//! flight, so a stale response can never overwrite the current view.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use super::{ArticleView, ContentLoader};
use crate::i18n::Language;

/// One-shot cancellation signal shared between a load and its owner
#[derive(Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // the sender lives as long as self, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an article view currently stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ArticleState {
    #[default]
    Idle,
    Loading,
    Loaded(ArticleView),
    /// Terminal: the reader is sent back to the blog index
    NotFound,
}

/// Result of a single [`ArticleSession::open`] call
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(ArticleView),
    NotFound,
    /// Superseded by a newer open, or the session was closed
    Cancelled,
}

/// A single article view and its in-flight load
pub struct ArticleSession {
    loader: ContentLoader,
    state: Mutex<ArticleState>,
    inflight: Mutex<Option<CancelToken>>,
}

impl ArticleSession {
    pub fn new(loader: ContentLoader) -> Self {
        Self {
            loader,
            state: Mutex::new(ArticleState::Idle),
            inflight: Mutex::new(None),
        }
    }

    /// Load `slug`, cancelling whatever this session was loading before
    pub async fn open(&self, lang: Language, slug: &str) -> LoadOutcome {
        let token = CancelToken::new();
        if let Some(previous) = self.inflight.lock().await.replace(token.clone()) {
            previous.cancel();
        }
        *self.state.lock().await = ArticleState::Loading;

        let result = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Load of {} cancelled", slug);
                return LoadOutcome::Cancelled;
            }
            result = self.loader.load_view(lang, slug) => result,
        };

        // a newer open may have raced us between completion and here
        if token.is_cancelled() {
            return LoadOutcome::Cancelled;
        }

        let (state, outcome) = match result {
            Ok(view) => (
                ArticleState::Loaded(view.clone()),
                LoadOutcome::Loaded(view),
            ),
            Err(_) => (ArticleState::NotFound, LoadOutcome::NotFound),
        };
        *self.state.lock().await = state;
        outcome
    }

    /// Cancel any in-flight load (the view is going away)
    pub async fn close(&self) {
        if let Some(token) = self.inflight.lock().await.take() {
            token.cancel();
        }
    }

    pub async fn state(&self) -> ArticleState {
        self.state.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentSource;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Serves every article instantly except `slow`, which takes a while
    struct SlowSource;

    #[async_trait]
    impl ContentSource for SlowSource {
        async fn fetch(&self, path: &str) -> crate::Result<String> {
            if path.ends_with("manifest.json") {
                return Ok("[]".to_string());
            }
            if path.ends_with("slow.md") {
                tokio::time::sleep(Duration::from_millis(300)).await;
                return Ok("# Slow\nbody".to_string());
            }
            if path.ends_with("missing.md") {
                return Err(crate::Error::not_found(path));
            }
            Ok("# Fast\nbody".to_string())
        }

        fn describe(&self) -> String {
            "slow-source".to_string()
        }
    }

    fn session() -> ArticleSession {
        ArticleSession::new(ContentLoader::new(Arc::new(SlowSource)))
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let session = session();
        assert_eq!(session.state().await, ArticleState::Idle);

        match session.open(Language::En, "fast").await {
            LoadOutcome::Loaded(view) => assert_eq!(view.article.title.as_deref(), Some("Fast")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(session.state().await, ArticleState::Loaded(_)));

        assert_eq!(session.open(Language::En, "missing").await, LoadOutcome::NotFound);
        assert_eq!(session.state().await, ArticleState::NotFound);
    }

    #[tokio::test]
    async fn test_newer_open_cancels_stale_load() {
        let session = session();

        let (stale, fresh) = tokio::join!(session.open(Language::En, "slow"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.open(Language::En, "fast").await
        });

        assert_eq!(stale, LoadOutcome::Cancelled);
        assert!(matches!(fresh, LoadOutcome::Loaded(_)));
        match session.state().await {
            ArticleState::Loaded(view) => assert_eq!(view.slug, "fast"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_cancels_inflight() {
        let session = session();
        let (outcome, _) = tokio::join!(session.open(Language::En, "slow"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.close().await;
        });
        assert_eq!(outcome, LoadOutcome::Cancelled);
        // the stale load never lands
        assert_eq!(session.state().await, ArticleState::Loading);
    }

    #[tokio::test]
    async fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        handle.await.unwrap();
        assert!(token.is_cancelled());
    }
}
