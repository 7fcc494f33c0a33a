//! List command: show stored articles.

use super::open_storage;
use crate::error::Result;
use crate::model::{Article, AUTO_IMPORT_TAG};
use chrono::{TimeZone, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ListOutput {
    count: usize,
    articles: Vec<ArticleSummary>,
}

/// Article without its body, for listings.
#[derive(Serialize)]
struct ArticleSummary {
    id: i64,
    slug: String,
    title: String,
    tags: String,
    status: &'static str,
    #[serde(rename = "type")]
    article_type: &'static str,
    content_hash: String,
    created_at: i64,
    updated_at: i64,
}

impl From<Article> for ArticleSummary {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            slug: a.slug,
            title: a.title,
            tags: a.tags,
            status: a.status.as_str(),
            article_type: a.article_type.as_str(),
            content_hash: a.content_hash,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Execute the list command.
///
/// Shows auto-synced articles unless `all` is set.
///
/// # Errors
///
/// Returns an error if the database is not initialized or the query fails.
pub fn execute(db_path: Option<&PathBuf>, limit: u32, all: bool, json: bool) -> Result<()> {
    let storage = open_storage(db_path)?;
    let tag = if all { None } else { Some(AUTO_IMPORT_TAG) };
    let articles: Vec<ArticleSummary> = storage
        .list_articles(tag, Some(limit))?
        .into_iter()
        .map(ArticleSummary::from)
        .collect();

    if json {
        let output = ListOutput {
            count: articles.len(),
            articles,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    println!("{}", format!("Articles ({})", articles.len()).bold());
    for article in &articles {
        println!(
            "  {:>5}  {:<24} {:<10} {}  {}",
            article.id,
            article.slug,
            article.tags.dimmed(),
            article.status,
            format_timestamp(article.updated_at)
        );
    }

    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| ms.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14 22:13");
    }
}
