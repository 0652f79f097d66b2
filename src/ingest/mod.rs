// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{FeedEntry, NewsItem, SourceProvider};
use std::collections::HashSet;

/// Character cap applied to summaries before an item leaves the adapter.
pub const SUMMARY_MAX_CHARS: usize = 300;

/// Normalize a feed summary: decode HTML entities, strip tags, collapse
/// whitespace.
pub fn clean_summary(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Truncate by characters, not bytes; summaries are mostly Cyrillic.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Case-sensitive substring match, OR across keywords. The keyword list
/// carries stems on purpose ("назнач" matches "назначил", "назначение").
pub fn matches_keywords(entry: &FeedEntry, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|kw| entry.title.contains(kw.as_str()) || entry.summary.contains(kw.as_str()))
}

/// Filter one provider's entries against the recency window, the seen set and
/// the keyword list. Matching titles are inserted into `seen` immediately, so
/// the next run will not reprocess them even if this run fails downstream.
pub fn select_entries(
    entries: Vec<FeedEntry>,
    cutoff: u64,
    keywords: &[String],
    seen: &mut HashSet<String>,
) -> Vec<NewsItem> {
    let mut out = Vec::new();
    for entry in entries {
        // Strict: an entry published exactly at the cutoff instant is kept.
        if entry.published_at < cutoff {
            continue;
        }
        if seen.contains(&entry.title) {
            continue;
        }
        if !matches_keywords(&entry, keywords) {
            continue;
        }
        seen.insert(entry.title.clone());
        out.push(NewsItem {
            title: entry.title,
            summary: truncate_chars(&clean_summary(&entry.summary), SUMMARY_MAX_CHARS),
            link: entry.link,
        });
    }
    out
}

/// Run the adapter across all configured sources. A source that fails to
/// fetch or parse contributes zero items and the rest still run. Returned
/// order is source order, then feed entry order.
pub async fn fetch_fresh(
    providers: &[Box<dyn SourceProvider>],
    cutoff: u64,
    keywords: &[String],
    seen: &mut HashSet<String>,
) -> Vec<NewsItem> {
    let mut fresh = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(entries) => {
                let mut items = select_entries(entries, cutoff, keywords, seen);
                fresh.append(&mut items);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = %p.name(), "provider error");
            }
        }
    }
    fresh
}
