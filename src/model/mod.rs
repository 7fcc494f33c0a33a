//! Data models for blogsync.
//!
//! - Article (stored) and NewArticle (to insert)
//! - ArticleStatus, ArticleType

pub mod article;

pub use article::{Article, ArticleStatus, ArticleType, NewArticle, AUTO_IMPORT_TAG};
