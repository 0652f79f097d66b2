// tests/ingest_window.rs
// Recency window + keyword filtering across fixture feeds.

mod common;

use satire_news_bot::ingest::providers::rss::RssProvider;
use satire_news_bot::ingest::types::SourceProvider;
use satire_news_bot::ingest::{fetch_fresh, select_entries};
use satire_news_bot::seen::SeenSet;

use common::entry;

const RIA_XML: &str = include_str!("fixtures/ria_rss.xml");

// Fixture timestamps (UTC): fresh items at 07:00 / 07:30, stale at 04 Aug 07:00.
const FIXTURE_FRESH_TS: u64 = 1754377200;

#[tokio::test]
async fn stale_and_offtopic_entries_are_dropped() {
    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(RssProvider::from_fixture("ria", RIA_XML))];
    let keywords = vec!["президент".to_string(), "указ".to_string()];
    let mut seen = SeenSet::new();

    // Cutoff one hour before the fresh items: yesterday's entry is outside.
    let cutoff = FIXTURE_FRESH_TS - 3600;
    let items = fetch_fresh(&providers, cutoff, &keywords, &mut seen).await;

    assert_eq!(items.len(), 1);
    assert!(items[0].title.contains("указ"));
    assert!(seen.contains(&items[0].title));
    assert_eq!(seen.len(), 1);
}

#[tokio::test]
async fn broken_source_does_not_abort_remaining_sources() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(RssProvider::from_fixture("garbage", "this is not xml")),
        Box::new(RssProvider::from_fixture("ria", RIA_XML)),
    ];
    let keywords = vec!["указ".to_string()];
    let mut seen = SeenSet::new();

    let items = fetch_fresh(&providers, FIXTURE_FRESH_TS - 3600, &keywords, &mut seen).await;
    assert_eq!(items.len(), 1);
}

#[test]
fn entry_exactly_at_cutoff_is_kept() {
    let keywords = vec!["санкции".to_string()];
    let mut seen = SeenSet::new();
    let items = select_entries(
        vec![
            entry("Новые санкции вступили в силу", "детали", 5_000),
            entry("Старые санкции обсудили", "детали", 4_999),
        ],
        5_000,
        &keywords,
        &mut seen,
    );
    // published < cutoff is strict: the boundary entry stays
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Новые санкции вступили в силу");
}

#[test]
fn source_then_entry_order_is_preserved() {
    let keywords = vec!["Россия".to_string()];
    let mut seen = SeenSet::new();
    let items = select_entries(
        vec![
            entry("Россия первая", "", 9_000),
            entry("Россия вторая", "", 8_000),
        ],
        1_000,
        &keywords,
        &mut seen,
    );
    assert_eq!(items[0].title, "Россия первая");
    assert_eq!(items[1].title, "Россия вторая");
}
