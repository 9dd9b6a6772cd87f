//! Content module - blog manifests, articles, and Markdown rendering

mod article;
pub mod loader;
mod markdown;
mod post;
pub mod session;
pub mod source;

pub use article::Article;
pub use loader::{ArticleView, ContentLoader};
pub use markdown::MarkdownRenderer;
pub use post::{filter_by_category, find_post, Category, CategoryFilter, Post};
pub use session::{ArticleSession, ArticleState, CancelToken, LoadOutcome};
pub use source::{ContentSource, FsSource, HttpSource};
