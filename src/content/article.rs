//! Article documents: an optional leading `# ` title plus a Markdown body

use serde::Serialize;

/// Leading heading marker that promotes the first line to the title
const TITLE_MARKER: &str = "# ";

/// A fetched article, split into title and body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: Option<String>,
    pub body: String,
}

impl Article {
    /// Split a raw document.
    ///
    /// When the first line starts with `# `, that line (marker removed,
    /// trimmed) becomes the title and the remaining lines, trimmed, become the
    /// body. Otherwise the whole text is the body, unchanged.
    pub fn parse(text: &str) -> Self {
        let (first, rest) = match text.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (text, ""),
        };

        match first.strip_prefix(TITLE_MARKER) {
            Some(title) => Self {
                title: Some(title.trim().to_string()),
                body: rest.trim().to_string(),
            },
            None => Self {
                title: None,
                body: text.to_string(),
            },
        }
    }

    /// Reassemble the document
    pub fn to_markdown(&self) -> String {
        match &self.title {
            Some(title) => format!("{}{}\n{}", TITLE_MARKER, title, self.body),
            None => self.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_title_is_extracted() {
        let article = Article::parse("# My Title\nBody text");
        assert_eq!(article.title.as_deref(), Some("My Title"));
        assert_eq!(article.body, "Body text");
    }

    #[test]
    fn test_body_is_trimmed_after_title() {
        let article = Article::parse("#   Spaced  \r\n\n\nFirst paragraph.\n\n");
        assert_eq!(article.title.as_deref(), Some("Spaced"));
        assert_eq!(article.body, "First paragraph.");
    }

    #[test]
    fn test_no_title_passes_through_unchanged() {
        let text = "Intro paragraph\n\n# Not first line\n  trailing  \n";
        let article = Article::parse(text);
        assert_eq!(article.title, None);
        assert_eq!(article.body, text);
        assert_eq!(article.to_markdown(), text);
    }

    #[test]
    fn test_h2_is_not_a_title() {
        let article = Article::parse("## Section\nbody");
        assert_eq!(article.title, None);
        assert_eq!(article.body, "## Section\nbody");
    }

    #[test]
    fn test_title_only_document() {
        let article = Article::parse("# Lonely");
        assert_eq!(article.title.as_deref(), Some("Lonely"));
        assert_eq!(article.body, "");
    }
}
