//! Built-in site templates using the Tera template engine
//!
//! All page templates are embedded directly in the binary.

use percent_encoding::utf8_percent_encode;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Category, CategoryFilter, Post};
use crate::i18n::{I18n, Language};
use crate::listing::{format_usd, Listing, QUERY_VALUE};
use crate::Result;

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all site templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("buy.html", include_str!("site/buy.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("article.html", include_str!("site/article.html")),
            // Partials
            (
                "partials/listing_card.html",
                include_str!("site/partials/listing_card.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("usd", usd_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: whole dollars with thousands separators
fn usd_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = tera::try_get_value!("usd", "value", u64, value);
    Ok(tera::Value::String(format_usd(amount)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub description: String,
    pub lang: String,
    pub languages: Vec<String>,
    pub blog_index: String,
    pub current_path: String,
    pub active: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingCard<'a> {
    #[serde(flatten)]
    pub listing: &'a Listing,
    /// Translated type badge, absent for unrecognized types
    pub type_label: Option<String>,
}

impl<'a> ListingCard<'a> {
    pub fn new(listing: &'a Listing, i18n: &I18n, lang: Language) -> Self {
        Self {
            listing,
            type_label: listing.type_label_key().map(|key| i18n.get(lang, key)),
        }
    }
}

pub fn listing_cards<'a>(
    listings: &[&'a Listing],
    i18n: &I18n,
    lang: Language,
) -> Vec<ListingCard<'a>> {
    listings
        .iter()
        .map(|listing| ListingCard::new(listing, i18n, lang))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard<'a> {
    #[serde(flatten)]
    pub post: &'a Post,
    pub display_title: &'a str,
    pub category_label: Option<String>,
    pub path: String,
}

impl<'a> PostCard<'a> {
    pub fn new(post: &'a Post, blog_index: &str, i18n: &I18n, lang: Language) -> Self {
        Self {
            post,
            display_title: post.display_title(),
            category_label: post.category.map(|c| i18n.get(lang, &c.label_key())),
            path: format!(
                "{}/{}?lang={}",
                blog_index,
                utf8_percent_encode(&post.slug, QUERY_VALUE),
                lang
            ),
        }
    }
}

pub fn post_cards<'a>(
    posts: &[&'a Post],
    blog_index: &str,
    i18n: &I18n,
    lang: Language,
) -> Vec<PostCard<'a>> {
    posts
        .iter()
        .map(|post| PostCard::new(post, blog_index, i18n, lang))
        .collect()
}

/// One entry of the blog category bar
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTab {
    pub label: String,
    pub path: String,
    pub active: bool,
}

pub fn category_tabs(
    selected: CategoryFilter,
    blog_index: &str,
    i18n: &I18n,
    lang: Language,
) -> Vec<CategoryTab> {
    let mut tabs = vec![CategoryTab {
        label: i18n.get(lang, "blog.all_articles"),
        path: format!("{}?lang={}", blog_index, lang),
        active: selected == CategoryFilter::All,
    }];
    tabs.extend(Category::ALL.iter().map(|category| CategoryTab {
        label: i18n.get(lang, &category.label_key()),
        path: format!(
            "{}?lang={}&category={}",
            blog_index,
            lang,
            category.as_str()
        ),
        active: selected == CategoryFilter::Only(*category),
    }));
    tabs
}

/// Context shared by every page: site data, translations and language
pub fn base_context(
    config: &SiteConfig,
    i18n: &I18n,
    lang: Language,
    current_path: &str,
    active: &'static str,
) -> Context {
    let page = PageData {
        title: config.title.clone(),
        description: config.description.clone(),
        lang: lang.code().to_string(),
        languages: Language::ALL.iter().map(|l| l.code().to_string()).collect(),
        blog_index: config.blog_index.clone(),
        current_path: current_path.to_string(),
        active,
    };

    let mut context = Context::new();
    context.insert("page", &page);
    context.insert("t", &i18n.get_all_translations(lang));
    context
}
