//! Sync types for refreshing articles from local files.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{CONFIG_SUFFIX, CONTENT_SUFFIX, DEFAULT_CONFIG_DIR, DEFAULT_CONTENT_DIR};
use crate::model::NewArticle;

/// Where a refresh looks for content and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Root scanned for articles.
    pub content_dir: PathBuf,
    /// Root scanned for the sync configuration file.
    pub config_dir: PathBuf,
    /// Path suffix of article files.
    pub content_suffix: String,
    /// Path suffix of the configuration file.
    pub config_suffix: String,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            content_suffix: CONTENT_SUFFIX.to_string(),
            config_suffix: CONFIG_SUFFIX.to_string(),
        }
    }
}

/// Allow-list of file keys to import.
///
/// An empty filter allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFilter {
    keys: BTreeSet<String>,
}

impl TargetFilter {
    /// Parse a comma-separated key list. Entries are trimmed; empty ones dropped.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        Self {
            keys: list
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Whether `key` should be imported.
    #[must_use]
    pub fn allows(&self, key: &str) -> bool {
        self.keys.is_empty() || self.keys.contains(key)
    }

    /// True when no restriction applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Allowed keys in sorted order, or `None` when unrestricted.
    #[must_use]
    pub fn keys(&self) -> Option<Vec<String>> {
        if self.keys.is_empty() {
            None
        } else {
            Some(self.keys.iter().cloned().collect())
        }
    }
}

/// What a refresh will do with one loaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDecision {
    /// Insert as a new article.
    Insert,
    /// Not in the target filter.
    SkipFiltered,
    /// The file has no lines.
    SkipEmpty,
}

/// One loaded file and the decision taken for it.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedEntry {
    pub key: String,
    pub line_count: usize,
    pub decision: EntryDecision,
    /// Present exactly when `decision` is `Insert`.
    #[serde(skip)]
    pub article: Option<NewArticle>,
}

/// The outcome of loading content and configuration, before any store write.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshPlan {
    pub content_dir: PathBuf,
    /// Allowed keys, `None` when everything is imported.
    pub filter: Option<Vec<String>>,
    pub entries: Vec<PlannedEntry>,
}

impl RefreshPlan {
    /// True when no content was found; a refresh then leaves the store alone.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Articles to insert, in plan order.
    pub fn articles(&self) -> impl Iterator<Item = &NewArticle> {
        self.entries.iter().filter_map(|e| e.article.as_ref())
    }

    /// Number of entries with the given decision.
    #[must_use]
    pub fn count(&self, decision: EntryDecision) -> usize {
        self.entries.iter().filter(|e| e.decision == decision).count()
    }
}

/// Statistics for a refresh.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    /// Identifier of this run, also recorded on its audit events.
    pub run_id: String,
    /// Distinct file keys loaded.
    pub loaded: usize,
    /// Previously auto-imported articles removed.
    pub deleted: usize,
    /// Articles inserted.
    pub inserted: usize,
    /// Inserted articles whose content matches what was removed.
    pub unchanged: usize,
    /// Files excluded by the target filter.
    pub skipped_filtered: usize,
    /// Files with no lines.
    pub skipped_empty: usize,
    /// Allowed keys, `None` when everything is imported.
    pub filter: Option<Vec<String>>,
    /// True when nothing was found and the store was left untouched.
    pub short_circuited: bool,
}

impl RefreshStats {
    /// Seed statistics from a plan; store counts are filled in later.
    #[must_use]
    pub fn from_plan(run_id: &str, plan: &RefreshPlan) -> Self {
        Self {
            run_id: run_id.to_string(),
            loaded: plan.entries.len(),
            skipped_filtered: plan.count(EntryDecision::SkipFiltered),
            skipped_empty: plan.count(EntryDecision::SkipEmpty),
            filter: plan.filter.clone(),
            ..Self::default()
        }
    }

    /// Operation name recorded as the comment on this run's audit events.
    #[must_use]
    pub fn op_name(&self) -> String {
        format!("refresh {}", self.run_id)
    }
}
