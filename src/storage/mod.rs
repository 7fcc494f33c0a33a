//! SQLite storage layer for blogsync.
//!
//! This module provides the persistence layer using SQLite with:
//! - WAL mode for concurrent reads
//! - Transaction discipline for atomic writes
//! - Audit events for history
//!
//! # Submodules
//!
//! - [`events`] - Audit event storage
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod events;
pub mod schema;
pub mod sqlite;

use std::collections::HashMap;

use crate::error::Result;
use crate::model::NewArticle;

pub use sqlite::{MutationContext, SqliteStorage};

/// Article writes available inside a store transaction.
pub trait ArticleWriter {
    /// Delete every article whose tags equal `tag`. Returns the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete_articles_by_tag(&mut self, tag: &str) -> Result<usize>;

    /// Insert an article. Returns the store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn add_article(&mut self, article: &NewArticle) -> Result<i64>;

    /// Content hashes of the articles carrying `tag`, keyed by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn content_hashes_by_tag(&mut self, tag: &str) -> Result<HashMap<String, String>>;
}

/// A store that can run article writes atomically.
pub trait ArticleStore {
    /// Run `f` inside one transaction.
    ///
    /// Commits when `f` returns `Ok`; rolls back every write made through the
    /// writer when `f` (or the commit) fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a store error opening or committing.
    fn with_transaction<R, F>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn ArticleWriter) -> Result<R>;
}
