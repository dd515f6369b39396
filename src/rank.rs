//! Deduplication and recency ranking of filtered items.

use crate::models::{FilteredItem, RankedItem};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, instrument};

/// Merge items from all topics, keeping one entry per link, newest first.
///
/// A link seen again replaces the stored item but keeps the slot of its first
/// sighting, so ties in publish time fall back to first-encounter order.
#[instrument(level = "debug", skip_all, fields(input = items.len()))]
pub fn rank(items: Vec<FilteredItem>) -> Vec<RankedItem> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut unique: Vec<RankedItem> = Vec::with_capacity(items.len());

    for item in items {
        match slots.entry(item.link.clone()) {
            Entry::Occupied(slot) => {
                debug!(link = %item.link, "Duplicate link; keeping latest copy");
                unique[*slot.get()] = item;
            }
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(item);
            }
        }
    }

    // stable: equal timestamps keep encounter order
    unique.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(title: &str, link: &str, hours_ago: i64) -> FilteredItem {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        FilteredItem {
            title: title.to_string(),
            link: link.to_string(),
            description: String::new(),
            published_at: now - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_duplicate_links_collapse() {
        let ranked = rank(vec![
            item("Yields climb", "https://example.com/yields", 5),
            item("Dollar slips", "https://example.com/dollar", 2),
            item("Yields climb (updated)", "https://example.com/yields", 5),
        ]);
        assert_eq!(ranked.len(), 2);
        let yields: Vec<_> = ranked
            .iter()
            .filter(|i| i.link == "https://example.com/yields")
            .collect();
        assert_eq!(yields.len(), 1);
        assert_eq!(yields[0].title, "Yields climb (updated)");
    }

    #[test]
    fn test_sorted_newest_first() {
        let ranked = rank(vec![
            item("old", "https://example.com/1", 30),
            item("new", "https://example.com/2", 1),
            item("mid", "https://example.com/3", 10),
        ]);
        let titles: Vec<_> = ranked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
        assert!(ranked.windows(2).all(|w| w[0].published_at >= w[1].published_at));
    }

    #[test]
    fn test_ties_keep_first_encounter_order() {
        let ranked = rank(vec![
            item("a", "https://example.com/a", 4),
            item("b", "https://example.com/b", 4),
            item("c", "https://example.com/c", 4),
            item("a again", "https://example.com/a", 4),
        ]);
        let links: Vec<_> = ranked.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
        assert_eq!(ranked[0].title, "a again");
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new()).is_empty());
    }
}
