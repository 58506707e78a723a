//! Tag filter over the card set.
//!
//! Derived data (`all_tags`, `filtered_cards`) is recomputed on demand from
//! the current snapshot.

use std::collections::BTreeSet;

use crate::domain::{normalize_tag, Flashcard};

/// Sorted, deduplicated union of every card's tags.
/// Computed from the full card set, not the filtered subset.
pub fn all_tags(cards: &[Flashcard]) -> BTreeSet<String> {
    cards.iter().flat_map(|c| c.tags.iter().cloned()).collect()
}

/// Cards matching any selected tag, in original order.
/// An empty selection means no filter.
pub fn filtered_cards<'a>(cards: &'a [Flashcard], selected: &BTreeSet<String>) -> Vec<&'a Flashcard> {
    if selected.is_empty() {
        return cards.iter().collect();
    }
    cards.iter().filter(|c| c.has_any_tag(selected)).collect()
}

/// The set of selected tags
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    selected: BTreeSet<String>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Add the tag if absent, remove it if present.
    /// Returns true if the tag is selected afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        if self.selected.remove(&tag) {
            false
        } else {
            self.selected.insert(tag);
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn apply<'a>(&self, cards: &'a [Flashcard]) -> Vec<&'a Flashcard> {
        filtered_cards(cards, &self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(id: i64, tags: &[&str]) -> Flashcard {
        Flashcard {
            id,
            question: format!("q{}", id),
            answer: format!("a{}", id),
            example: None,
            example_translation: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: None,
            last_seen: None,
            created_at: Utc::now(),
        }
    }

    fn ids(cards: &[&Flashcard]) -> Vec<i64> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_all_tags_sorted_and_deduplicated() {
        let cards = vec![card(1, &["food", "basics"]), card(2, &["basics", "animals"])];
        let tags: Vec<_> = all_tags(&cards).into_iter().collect();
        assert_eq!(tags, vec!["animals", "basics", "food"]);
    }

    #[test]
    fn test_all_tags_ignores_filter() {
        let cards = vec![card(1, &["x"]), card(2, &["y"])];
        let mut filter = TagFilter::new();
        filter.toggle("x");
        assert_eq!(filter.apply(&cards).len(), 1);
        assert_eq!(all_tags(&cards).len(), 2);
    }

    #[test]
    fn test_empty_selection_returns_all_in_order() {
        let cards = vec![card(3, &["x"]), card(1, &["y"]), card(2, &["z"])];
        let filtered = filtered_cards(&cards, &BTreeSet::new());
        assert_eq!(ids(&filtered), vec![3, 1, 2]);
    }

    #[test]
    fn test_filter_or_semantics() {
        let cards = vec![card(1, &["x", "y"]), card(2, &["y", "z"])];

        let only_x = BTreeSet::from(["x".to_string()]);
        assert_eq!(ids(&filtered_cards(&cards, &only_x)), vec![1]);

        let x_or_z = BTreeSet::from(["x".to_string(), "z".to_string()]);
        assert_eq!(ids(&filtered_cards(&cards, &x_or_z)), vec![1, 2]);
    }

    #[test]
    fn test_filter_no_match() {
        let cards = vec![card(1, &["x"])];
        let selected = BTreeSet::from(["nope".to_string()]);
        assert!(filtered_cards(&cards, &selected).is_empty());
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut filter = TagFilter::new();
        filter.toggle("food");
        let before = filter.selected().clone();

        assert!(filter.toggle("travel"));
        assert!(!filter.toggle("travel"));
        assert_eq!(filter.selected(), &before);
    }

    #[test]
    fn test_toggle_normalizes_case() {
        let mut filter = TagFilter::new();
        filter.toggle("Food");
        assert!(filter.selected().contains("food"));
        assert!(!filter.toggle("FOOD"));
        assert!(!filter.is_active());
    }

    #[test]
    fn test_clear() {
        let mut filter = TagFilter::new();
        filter.toggle("a");
        filter.toggle("b");
        assert!(filter.is_active());

        filter.clear();
        assert!(filter.selected().is_empty());
        assert!(!filter.is_active());
    }
}
