//! Refresh command: sync the Markdown tree into the article table.

use super::{open_storage, refresh_settings};
use crate::config::default_actor;
use crate::error::Result;
use crate::storage::events::get_events_by_comment;
use crate::sync::{plan_refresh, EntryDecision, RefreshPlan, RefreshStats, Refresher};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the refresh command.
///
/// With `dry_run`, loads content and prints the plan without opening the
/// database.
///
/// # Errors
///
/// Returns an error if the database is not initialized, content cannot be
/// loaded, or the store rejects the transaction.
pub fn execute(
    db_path: Option<&PathBuf>,
    content_dir: Option<&Path>,
    config_dir: Option<&Path>,
    actor: Option<&str>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let settings = refresh_settings(content_dir, config_dir);

    if dry_run {
        let plan = plan_refresh(&settings)?;
        if json {
            let output = serde_json::json!({
                "dry_run": true,
                "plan": plan,
            });
            println!("{}", serde_json::to_string(&output)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let mut storage = open_storage(db_path)?;
    let actor = actor.map_or_else(default_actor, ToString::to_string);
    let stats = Refresher::new(&mut storage, settings, &actor).refresh()?;
    let audit_events = get_events_by_comment(storage.conn(), &stats.op_name())?.len();

    if json {
        let output = serde_json::json!({
            "success": true,
            "stats": stats,
            "audit_events": audit_events,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print_stats(&stats, audit_events);
    }

    Ok(())
}

fn print_plan(plan: &RefreshPlan) {
    println!("Dry run for: {}", plan.content_dir.display());
    if let Some(keys) = &plan.filter {
        println!("Target filter: {}", keys.join(", "));
    }
    println!();

    if plan.is_empty() {
        println!("No Markdown files found. Existing articles would be left untouched.");
        return;
    }

    for entry in &plan.entries {
        let marker = match entry.decision {
            EntryDecision::Insert => "import".green(),
            EntryDecision::SkipFiltered => "skip (not targeted)".yellow(),
            EntryDecision::SkipEmpty => "skip (empty)".dimmed(),
        };
        println!("  {:<24} {:>5} lines  {marker}", entry.key, entry.line_count);
    }

    println!();
    println!(
        "{} to import, all auto-synced articles would be replaced",
        plan.count(EntryDecision::Insert)
    );
}

fn print_stats(stats: &RefreshStats, audit_events: usize) {
    if stats.short_circuited {
        println!("No Markdown files found. Articles left untouched.");
        return;
    }

    println!("{}", "Refresh complete".green().bold());
    println!();
    println!("  Loaded:    {}", stats.loaded);
    println!("  Deleted:   {}", stats.deleted);
    println!(
        "  Inserted:  {} ({} unchanged)",
        stats.inserted, stats.unchanged
    );
    if stats.skipped_filtered > 0 {
        println!("  Filtered:  {}", stats.skipped_filtered);
    }
    if stats.skipped_empty > 0 {
        println!("  Empty:     {}", stats.skipped_empty);
    }
    println!();
    println!(
        "  Run: {} ({audit_events} audit events)",
        stats.run_id.dimmed()
    );
}
