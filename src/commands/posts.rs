//! List blog posts

use anyhow::Result;

use crate::content::{filter_by_category, CategoryFilter, Post};
use crate::i18n::Language;
use crate::Site;

/// List the posts of one language, optionally narrowed to a category
pub async fn run(site: &Site, lang: Option<&str>, category: Option<&str>) -> Result<()> {
    let lang = Language::negotiate(lang, None, site.default_language());
    let filter = category.map(CategoryFilter::parse).unwrap_or_default();

    let manifest = site.content_loader().load_manifest(lang).await;
    let posts = filter_by_category(&manifest, filter);

    println!("Posts [{}, {}] ({}):", lang, filter.as_str(), posts.len());
    for post in posts {
        println!("  {}", post_line(post));
    }

    Ok(())
}

fn post_line(post: &Post) -> String {
    let category = post.category.map(|c| c.as_str()).unwrap_or("-");
    match &post.date {
        Some(date) => format!("{} - {} [{}] ({})", date, post.display_title(), category, post.slug),
        None => format!("{} [{}] ({})", post.display_title(), category, post.slug),
    }
}
