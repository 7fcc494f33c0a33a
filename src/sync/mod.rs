//! Markdown → article sync.
//!
//! This module replaces the auto-imported slice of the article table with
//! the current contents of a local Markdown tree:
//!
//! - **Planning**: load files, apply the optional target filter, skip empties
//! - **Refresh**: delete-by-tag and insert in one store transaction
//! - **Hashing**: SHA256 content hashing to report unchanged articles
//!
//! # Configuration
//!
//! The first `config.properties` found under the config root may carry a
//! `target` property listing the file keys to import:
//!
//! ```text
//! target=hello,about
//! ```
//!
//! A missing file, missing property or unreadable file means "import all".
//!
//! # Example
//!
//! ```ignore
//! use blogsync::sync::{RefreshSettings, Refresher};
//!
//! let mut refresher = Refresher::new(&mut storage, RefreshSettings::default(), "me");
//! let stats = refresher.refresh()?;
//! ```

mod hash;
mod refresh;
mod types;

pub use hash::{content_hash, has_changed};
pub use refresh::{plan_refresh, read_target_filter, Refresher, TARGET_PROPERTY};
pub use types::{
    EntryDecision, PlannedEntry, RefreshPlan, RefreshSettings, RefreshStats, TargetFilter,
};
