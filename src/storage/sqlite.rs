//! SQLite storage implementation.
//!
//! This module provides the main storage backend for blogsync using SQLite.
//! It follows the MutationContext pattern for transaction discipline and audit logging.

use crate::error::Result;
use crate::model::{Article, ArticleStatus, ArticleType, NewArticle};
use crate::storage::events::{insert_event, Event, EventType};
use crate::storage::schema::apply_schema;
use crate::storage::{ArticleStore, ArticleWriter};
use crate::sync::content_hash;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const ARTICLE_COLUMNS: &str = "id, slug, title, content, tags, status, type, allow_comment, hits, comments_num, content_hash, created_at, updated_at";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, tracking side effects.
///
/// This struct is passed to mutation closures to record audit events,
/// which are written just before the transaction commits.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event for this operation.
    ///
    /// The operation name is stored as the event comment so all events of
    /// one operation can be found together.
    pub fn record_event(&mut self, entity_type: &str, entity_id: &str, event_type: EventType) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor).with_comment(&self.op_name),
        );
    }

    /// Record an event with old/new values for field tracking.
    pub fn record_change(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        event_type: EventType,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor)
                .with_values(old_value, new_value)
                .with_comment(&self.op_name),
        );
    }
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// The timeout bounds how long a writer waits for another writer (for
    /// example a concurrent refresh) to release the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (takes the write lock up front)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);

        // Dropping `tx` on the error path rolls back
        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        Ok(result)
    }

    // ==================
    // Article Operations
    // ==================

    /// Create a single article outside of a refresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_article(&mut self, article: &NewArticle, actor: &str) -> Result<i64> {
        self.mutate("create_article", actor, |tx, ctx| {
            insert_article(tx, ctx, article)
        })
    }

    /// Delete an article by ID.
    ///
    /// Returns `false` if no article had that ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_article(&mut self, id: i64, actor: &str) -> Result<bool> {
        self.mutate("delete_article", actor, |tx, ctx| {
            let rows = tx.execute("DELETE FROM articles WHERE id = ?1", [id])?;
            if rows > 0 {
                ctx.record_event("article", &id.to_string(), EventType::ArticleDeleted);
            }
            Ok(rows > 0)
        })
    }

    /// Get an article by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"))?;

        let article = stmt.query_row([id], map_article).optional()?;
        Ok(article)
    }

    /// List articles, newest first, optionally restricted to one tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_articles(&self, tag: Option<&str>, limit: Option<u32>) -> Result<Vec<Article>> {
        let limit = limit.map_or(-1, i64::from);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles
             WHERE (?1 IS NULL OR tags = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        ))?;

        let rows = stmt.query_map(rusqlite::params![tag, limit], map_article)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Count articles carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_articles_by_tag(&self, tag: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE tags = ?1",
            [tag],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl ArticleStore for SqliteStorage {
    fn with_transaction<R, F>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn ArticleWriter) -> Result<R>,
    {
        self.mutate(op, actor, |tx, ctx| {
            let mut writer = TxArticleWriter { conn: tx, ctx };
            f(&mut writer)
        })
    }
}

/// [`ArticleWriter`] bound to an open transaction.
struct TxArticleWriter<'a> {
    conn: &'a Connection,
    ctx: &'a mut MutationContext,
}

impl ArticleWriter for TxArticleWriter<'_> {
    fn delete_articles_by_tag(&mut self, tag: &str) -> Result<usize> {
        let rows = self
            .conn
            .execute("DELETE FROM articles WHERE tags = ?1", [tag])?;
        self.ctx.record_change(
            "tag",
            tag,
            EventType::ArticlesPurged,
            None,
            Some(rows.to_string()),
        );
        Ok(rows)
    }

    fn add_article(&mut self, article: &NewArticle) -> Result<i64> {
        insert_article(self.conn, self.ctx, article)
    }

    fn content_hashes_by_tag(&mut self, tag: &str) -> Result<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug, content_hash FROM articles WHERE tags = ?1")?;
        let rows = stmt.query_map([tag], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<std::result::Result<HashMap<_, _>, _>>()?)
    }
}

fn insert_article(conn: &Connection, ctx: &mut MutationContext, article: &NewArticle) -> Result<i64> {
    let now = chrono::Utc::now().timestamp_millis();

    conn.execute(
        "INSERT INTO articles (slug, title, content, tags, status, type, allow_comment, content_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        rusqlite::params![
            article.slug,
            article.title,
            article.content,
            article.tags,
            article.status.as_str(),
            article.article_type.as_str(),
            article.allow_comment,
            content_hash(&article.content),
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();
    ctx.record_event("article", &id.to_string(), EventType::ArticleCreated);
    Ok(id)
}

fn map_article(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        tags: row.get(4)?,
        status: ArticleStatus::from_str(&row.get::<_, String>(5)?),
        article_type: ArticleType::from_str(&row.get::<_, String>(6)?),
        allow_comment: row.get(7)?,
        hits: row.get(8)?,
        comments_num: row.get(9)?,
        content_hash: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::AUTO_IMPORT_TAG;
    use crate::storage::events::get_events_by_comment;

    fn manual_article(slug: &str) -> NewArticle {
        NewArticle {
            slug: slug.to_string(),
            title: format!("Manual {slug}"),
            content: "written by hand\n".to_string(),
            tags: "notes".to_string(),
            status: ArticleStatus::Draft,
            article_type: ArticleType::Page,
            allow_comment: false,
        }
    }

    #[test]
    fn test_open_memory() {
        let storage = SqliteStorage::open_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_article_crud() {
        let mut storage = SqliteStorage::open_memory().unwrap();

        let id = storage.create_article(&manual_article("about"), "actor").unwrap();

        let article = storage.get_article(id).unwrap().unwrap();
        assert_eq!(article.slug, "about");
        assert_eq!(article.title, "Manual about");
        assert_eq!(article.status, ArticleStatus::Draft);
        assert_eq!(article.article_type, ArticleType::Page);
        assert!(!article.allow_comment);
        assert_eq!(article.hits, 0);
        assert_eq!(article.content_hash, content_hash("written by hand\n"));

        assert_eq!(storage.list_articles(None, None).unwrap().len(), 1);
        assert_eq!(storage.list_articles(Some("notes"), None).unwrap().len(), 1);
        assert!(storage.list_articles(Some(AUTO_IMPORT_TAG), None).unwrap().is_empty());

        assert!(storage.delete_article(id, "actor").unwrap());
        assert!(!storage.delete_article(id, "actor").unwrap());
        assert!(storage.get_article(id).unwrap().is_none());
    }

    #[test]
    fn test_list_articles_limit() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        for slug in ["a", "b", "c"] {
            storage.create_article(&manual_article(slug), "actor").unwrap();
        }

        assert_eq!(storage.list_articles(None, Some(2)).unwrap().len(), 2);
        assert_eq!(storage.list_articles(None, None).unwrap().len(), 3);
    }

    #[test]
    fn test_transaction_replaces_only_tagged_articles() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_article(&manual_article("keep"), "actor").unwrap();
        let old = NewArticle::from_lines("old", &["old body"]).unwrap();
        storage.create_article(&old, "actor").unwrap();

        let deleted = storage
            .with_transaction("refresh test", "actor", |w| {
                let deleted = w.delete_articles_by_tag(AUTO_IMPORT_TAG)?;
                w.add_article(&NewArticle::from_lines("new", &["new body"]).unwrap())?;
                Ok(deleted)
            })
            .unwrap();

        assert_eq!(deleted, 1);
        let tagged = storage.list_articles(Some(AUTO_IMPORT_TAG), None).unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].slug, "new");
        assert_eq!(storage.count_articles_by_tag("notes").unwrap(), 1);

        let events = get_events_by_comment(storage.conn(), "refresh test").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::ArticlesPurged);
        assert_eq!(events[1].event_type, EventType::ArticleCreated);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let old = NewArticle::from_lines("old", &["old body"]).unwrap();
        storage.create_article(&old, "actor").unwrap();

        let result: Result<()> = storage.with_transaction("refresh failing", "actor", |w| {
            w.delete_articles_by_tag(AUTO_IMPORT_TAG)?;
            w.add_article(&NewArticle::from_lines("new", &["new body"]).unwrap())?;
            Err(Error::Other("insert failed".to_string()))
        });

        assert!(result.is_err());
        let tagged = storage.list_articles(Some(AUTO_IMPORT_TAG), None).unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].slug, "old");
        assert!(get_events_by_comment(storage.conn(), "refresh failing")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_content_hashes_by_tag() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .create_article(&NewArticle::from_lines("a", &["x"]).unwrap(), "actor")
            .unwrap();
        storage.create_article(&manual_article("b"), "actor").unwrap();

        let hashes = storage
            .with_transaction("read", "actor", |w| w.content_hashes_by_tag(AUTO_IMPORT_TAG))
            .unwrap();

        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes["a"], content_hash("x\n"));
    }

    #[test]
    fn test_busy_writer_fails_instead_of_interleaving() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("blogsync.db");
        let mut first = SqliteStorage::open(&path).unwrap();
        let mut second = SqliteStorage::open_with_timeout(&path, Some(50)).unwrap();

        let result = first.with_transaction("outer", "a", |w| {
            w.delete_articles_by_tag(AUTO_IMPORT_TAG)?;
            Ok(second.with_transaction("inner", "b", |w| w.delete_articles_by_tag(AUTO_IMPORT_TAG)))
        });

        let inner = result.unwrap();
        assert!(matches!(inner, Err(Error::Database(_))));
    }
}
