//! Article model.
//!
//! Articles are the blog's published content. The sync process builds a
//! [`NewArticle`] per Markdown file; the store assigns identity and
//! timestamps and returns [`Article`]s on read.

use serde::{Deserialize, Serialize};

/// Tag attached to every article created by the sync process.
pub const AUTO_IMPORT_TAG: &str = "auto-sync";

/// Article visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Publish,
    Draft,
}

impl ArticleStatus {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "draft" => Self::Draft,
            _ => Self::Publish,
        }
    }
}

/// Content type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    #[default]
    Post,
    Page,
}

impl ArticleType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "page" => Self::Page,
            _ => Self::Post,
        }
    }
}

/// An article to insert. Identity and timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    /// File key the article was built from
    pub slug: String,

    /// Display title
    pub title: String,

    /// Markdown body
    pub content: String,

    /// Comma-separated tags
    pub tags: String,

    pub status: ArticleStatus,

    #[serde(rename = "type")]
    pub article_type: ArticleType,

    pub allow_comment: bool,
}

impl NewArticle {
    /// Build an auto-imported article from a file key and its lines.
    ///
    /// Every line is followed by exactly one `\n`, so `["# Hi", "body"]`
    /// becomes `"# Hi\nbody\n"`. Returns `None` for an empty file.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(key: &str, lines: &[S]) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }

        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }

        Some(Self {
            slug: key.to_string(),
            title: key.to_string(),
            content,
            tags: AUTO_IMPORT_TAG.to_string(),
            status: ArticleStatus::Publish,
            article_type: ArticleType::Post,
            allow_comment: true,
        })
    }
}

/// A stored article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Store-assigned identifier
    pub id: i64,

    pub slug: String,
    pub title: String,
    pub content: String,
    pub tags: String,
    pub status: ArticleStatus,

    #[serde(rename = "type")]
    pub article_type: ArticleType,

    pub allow_comment: bool,
    pub hits: i64,
    pub comments_num: i64,

    /// SHA-256 hex digest of `content`
    pub content_hash: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}
