//! Refresh: replace auto-imported articles with the local Markdown tree.
//!
//! A refresh:
//! 1. Reads the optional target filter (best effort, errors mean "no filter")
//! 2. Loads file key → lines from the content root (errors propagate)
//! 3. Stops if nothing was found, leaving the store untouched
//! 4. In one transaction, deletes every article tagged [`AUTO_IMPORT_TAG`]
//!    and inserts one article per allowed, non-empty file

use std::path::Path;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{load_properties, ConfigError};
use crate::error::Result;
use crate::loader::{list_matching, load_content_map};
use crate::model::{NewArticle, AUTO_IMPORT_TAG};
use crate::storage::ArticleStore;
use crate::sync::hash::{content_hash, has_changed};
use crate::sync::types::{
    EntryDecision, PlannedEntry, RefreshPlan, RefreshSettings, RefreshStats, TargetFilter,
};

/// Property holding the comma-separated key allow-list.
pub const TARGET_PROPERTY: &str = "target";

/// Read the target filter from the first config file under `config_dir`.
///
/// Matches are sorted by path so "first" is stable. Returns `Ok(None)` when
/// no file matches.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the directory cannot be walked, the file
/// cannot be read or parsed, or the `target` property is missing.
pub fn read_target_filter(
    config_dir: &Path,
    config_suffix: &str,
) -> std::result::Result<Option<TargetFilter>, ConfigError> {
    let mut files = list_matching(config_dir, config_suffix)?;
    files.sort();

    let Some(first) = files.first() else {
        return Ok(None);
    };

    let props = load_properties(first)?;
    let target = props.require(TARGET_PROPERTY)?;
    debug!(path = %first.display(), target, "Loaded sync config");
    Ok(Some(TargetFilter::parse(target)))
}

/// Load content and decide what a refresh would do, without writing.
///
/// Entries are sorted by key.
///
/// # Errors
///
/// Returns a load error if the content root is missing or any matching
/// file cannot be read. Configuration problems are not errors.
pub fn plan_refresh(settings: &RefreshSettings) -> Result<RefreshPlan> {
    let filter = match read_target_filter(&settings.config_dir, &settings.config_suffix) {
        Ok(filter) => filter.unwrap_or_default(),
        Err(e) => {
            debug!(error = %e, "Sync config unavailable, importing everything");
            TargetFilter::default()
        }
    };

    let content = load_content_map(&settings.content_dir, &settings.content_suffix)?;

    let mut entries: Vec<PlannedEntry> = content
        .into_iter()
        .map(|(key, lines)| {
            let (decision, article) = if !filter.allows(&key) {
                (EntryDecision::SkipFiltered, None)
            } else {
                match NewArticle::from_lines(&key, &lines) {
                    Some(article) => (EntryDecision::Insert, Some(article)),
                    None => (EntryDecision::SkipEmpty, None),
                }
            };
            PlannedEntry {
                line_count: lines.len(),
                key,
                decision,
                article,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    Ok(RefreshPlan {
        content_dir: settings.content_dir.clone(),
        filter: filter.keys(),
        entries,
    })
}

/// Runs refreshes against an [`ArticleStore`].
pub struct Refresher<'a, S: ArticleStore> {
    store: &'a mut S,
    settings: RefreshSettings,
    actor: String,
}

impl<'a, S: ArticleStore> Refresher<'a, S> {
    /// Create a refresher. `actor` is recorded on the audit events.
    #[must_use]
    pub fn new(store: &'a mut S, settings: RefreshSettings, actor: &str) -> Self {
        Self {
            store,
            settings,
            actor: actor.to_string(),
        }
    }

    /// Preview the refresh without touching the store.
    ///
    /// # Errors
    ///
    /// Same as [`plan_refresh`].
    pub fn plan(&self) -> Result<RefreshPlan> {
        plan_refresh(&self.settings)
    }

    /// Replace all auto-imported articles with the current local content.
    ///
    /// Deletion and insertion happen in one transaction: if any store call
    /// fails, nothing is committed and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns load errors (before any write) and store errors.
    pub fn refresh(&mut self) -> Result<RefreshStats> {
        let run_id = Uuid::new_v4().to_string();
        let plan = self.plan()?;
        let mut stats = RefreshStats::from_plan(&run_id, &plan);

        if plan.is_empty() {
            info!(
                run_id = %run_id,
                content_dir = %plan.content_dir.display(),
                "No content found, leaving articles untouched"
            );
            stats.short_circuited = true;
            return Ok(stats);
        }

        info!(run_id = %run_id, loaded = stats.loaded, "Refreshing auto-imported articles");

        let op = stats.op_name();
        let (deleted, inserted, unchanged) =
            self.store.with_transaction(&op, &self.actor, |writer| {
                let previous = writer.content_hashes_by_tag(AUTO_IMPORT_TAG)?;
                let deleted = writer.delete_articles_by_tag(AUTO_IMPORT_TAG)?;

                let mut inserted = 0;
                let mut unchanged = 0;
                for article in plan.articles() {
                    let id = writer.add_article(article)?;
                    debug!(id, key = %article.slug, "Inserted article");
                    inserted += 1;

                    let stored = previous.get(&article.slug).map(String::as_str);
                    if !has_changed(&content_hash(&article.content), stored) {
                        unchanged += 1;
                    }
                }

                Ok((deleted, inserted, unchanged))
            })?;

        stats.deleted = deleted;
        stats.inserted = inserted;
        stats.unchanged = unchanged;

        info!(
            run_id = %run_id,
            deleted,
            inserted,
            unchanged,
            skipped_filtered = stats.skipped_filtered,
            skipped_empty = stats.skipped_empty,
            "Refresh complete"
        );
        Ok(stats)
    }
}
