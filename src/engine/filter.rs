use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::deck::Card;

/// Category selection. An empty selection lets every card through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    selected: BTreeSet<String>,
}

impl CategoryFilter {
    pub fn new<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    pub fn toggle(&mut self, category: &str) {
        if !self.selected.remove(category) {
            self.selected.insert(category.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected.contains(category)
    }

    pub fn is_allowed(&self, card: &Card) -> bool {
        self.selected.is_empty() || card.categories.iter().any(|c| self.selected.contains(c))
    }

    pub fn filter_cards<'a>(&self, cards: &'a [Card]) -> Vec<&'a Card> {
        cards.iter().filter(|c| self.is_allowed(c)).collect()
    }

    /// Header label: `ALL` or the selected categories joined with bullets.
    pub fn label(&self) -> String {
        if self.selected.is_empty() {
            "ALL".to_string()
        } else {
            self.selected.iter().cloned().collect::<Vec<_>>().join(" • ")
        }
    }
}

/// Least-studied-first ordering of the cards the filter lets through.
///
/// Ties are re-randomized on every call: the list is shuffled before a stable
/// sort on study count.
pub fn order<R: Rng + ?Sized>(deck: &[Card], filter: &CategoryFilter, rng: &mut R) -> Vec<Card> {
    let mut ordered: Vec<Card> = filter.filter_cards(deck).into_iter().cloned().collect();
    ordered.shuffle(rng);
    ordered.sort_by_key(|c| c.study_count);
    ordered
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::deck::LanguagePair;

    fn card(id: u64, count: u32, category: &str) -> Card {
        let mut c = Card::new(id, &LanguagePair::default(), "f", "b", category);
        c.study_count = count;
        c
    }

    #[test]
    fn empty_selection_passes_everything() {
        let deck = vec![card(1, 0, "A"), card(2, 0, "B")];
        let filter = CategoryFilter::default();
        assert_eq!(filter.filter_cards(&deck).len(), 2);
        assert_eq!(filter.label(), "ALL");
    }

    #[test]
    fn selection_keeps_intersecting_cards() {
        let mut multi = card(3, 0, "A");
        multi.categories.insert("C".to_string());
        let deck = vec![card(1, 0, "A"), card(2, 0, "B"), multi];
        let mut filter = CategoryFilter::default();
        filter.toggle("C");
        let ids: Vec<u64> = filter.filter_cards(&deck).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3]);

        filter.toggle("B");
        assert_eq!(filter.filter_cards(&deck).len(), 2);
        assert_eq!(filter.label(), "B • C");

        filter.toggle("B");
        assert!(!filter.is_selected("B"));
    }

    #[test]
    fn order_is_ascending_by_study_count() {
        let deck = vec![card(1, 5, "A"), card(2, 0, "A"), card(3, 2, "A")];
        let mut rng = SmallRng::seed_from_u64(7);
        let ids: Vec<u64> = order(&deck, &CategoryFilter::default(), &mut rng)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn ties_are_randomized_between_calls() {
        let deck: Vec<Card> = (1..=8).map(|id| card(id, 0, "A")).collect();
        let mut rng = SmallRng::seed_from_u64(42);
        let filter = CategoryFilter::default();
        let first: Vec<u64> = order(&deck, &filter, &mut rng).iter().map(|c| c.id).collect();
        let differs = (0..20).any(|_| {
            let next: Vec<u64> = order(&deck, &filter, &mut rng).iter().map(|c| c.id).collect();
            next != first
        });
        assert!(differs, "tie order should not be stable across calls");
    }

    #[test]
    fn empty_deck_orders_to_empty() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(order(&[], &CategoryFilter::default(), &mut rng).is_empty());
    }
}
