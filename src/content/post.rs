//! Blog post metadata as listed in a language manifest

use serde::{Deserialize, Deserializer, Serialize};

/// Blog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Buying,
    Selling,
    Renting,
    Investment,
    Market,
    /// Anything the manifest names that we do not know about
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Buying,
        Category::Selling,
        Category::Renting,
        Category::Investment,
        Category::Market,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Buying => "buying",
            Category::Selling => "selling",
            Category::Renting => "renting",
            Category::Investment => "investment",
            Category::Market => "market",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Translation key for the category label
    pub fn label_key(&self) -> String {
        format!("blog.categories.{}", self.as_str())
    }
}

/// A manifest entry. Only the slug is required; every other field may be
/// missing and then simply renders as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique key, also the article file name
    pub slug: String,

    /// Numeric or string ids are both kept, as text
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub author: Option<String>,

    /// Display string, never parsed
    pub date: Option<String>,

    /// Display string ("5 min read")
    pub read_time: Option<String>,

    pub excerpt: Option<String>,
}

impl Post {
    /// Create a post with only a slug
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            id: None,
            title: None,
            category: None,
            image_url: None,
            author: None,
            date: None,
            read_time: None,
            excerpt: None,
        }
    }

    /// Title, or the slug when the manifest has none
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.slug)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|id| match id {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    }))
}

/// Category selection on the blog index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// "" and "all" select everything; unknown names also fall back to All
    pub fn parse(s: &str) -> Self {
        Category::parse(s).map_or(CategoryFilter::All, CategoryFilter::Only)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }
}

/// Posts in the selected category, manifest order preserved
pub fn filter_by_category(posts: &[Post], filter: CategoryFilter) -> Vec<&Post> {
    match filter {
        CategoryFilter::All => posts.iter().collect(),
        CategoryFilter::Only(category) => posts
            .iter()
            .filter(|p| p.category == Some(category))
            .collect(),
    }
}

/// Manifest metadata for `slug`; a miss is not an error
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|p| p.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[
        {"id": 1, "slug": "buying-guide", "title": "Buying Guide", "category": "buying",
         "imageUrl": "/img/a.jpg", "author": "Maria Gonzalez", "date": "Jan 15, 2026",
         "readTime": "8 min read", "excerpt": "Where to start"},
        {"slug": "market-2026", "category": "market"},
        {"slug": "mystery", "category": "auctions", "author": null}
    ]"#;

    #[test]
    fn test_manifest_entries_with_missing_fields() {
        let posts: Vec<Post> = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].read_time.as_deref(), Some("8 min read"));
        assert_eq!(posts[1].author, None);
        assert_eq!(posts[1].display_title(), "market-2026");
        assert_eq!(posts[2].category, Some(Category::Other));
        assert_eq!(posts[2].author, None);
    }

    #[test]
    fn test_manifest_ids_numeric_or_text() {
        let posts: Vec<Post> = serde_json::from_str(
            r#"[
                {"id": 7, "slug": "seven"},
                {"id": "3f2b8c1e-9a4d-4e6b-8f1a-2c5d7e9b0a11", "slug": "uuid"},
                {"id": null, "slug": "nothing"},
                {"slug": "absent"}
            ]"#,
        )
        .unwrap();
        assert_eq!(posts[0].id.as_deref(), Some("7"));
        assert_eq!(
            posts[1].id.as_deref(),
            Some("3f2b8c1e-9a4d-4e6b-8f1a-2c5d7e9b0a11")
        );
        assert_eq!(posts[2].id, None);
        assert_eq!(posts[3].id, None);
    }

    #[test]
    fn test_filter_by_category() {
        let posts: Vec<Post> = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(filter_by_category(&posts, CategoryFilter::All).len(), 3);

        let market = filter_by_category(&posts, CategoryFilter::parse("market"));
        assert_eq!(market.len(), 1);
        assert_eq!(market[0].slug, "market-2026");

        assert!(filter_by_category(&posts, CategoryFilter::Only(Category::Renting)).is_empty());
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Investment"),
            CategoryFilter::Only(Category::Investment)
        );
    }

    #[test]
    fn test_find_post() {
        let posts: Vec<Post> = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(
            find_post(&posts, "buying-guide").and_then(|p| p.author.as_deref()),
            Some("Maria Gonzalez")
        );
        assert!(find_post(&posts, "nope").is_none());
    }
}
