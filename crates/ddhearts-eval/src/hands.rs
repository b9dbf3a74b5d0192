use ddhearts_core::model::card::Card;
use ddhearts_core::model::deck::Deck;
use ddhearts_core::playout::FIXED_HAND_SIZE;
use rand::Rng;
use rand::seq::SliceRandom;

/// Source of random 10-card hands drawn from a full deck.
///
/// Hands are independent draws; the same hand may come up twice.
pub struct RandomHands {
    deck: Vec<Card>,
}

impl RandomHands {
    pub fn new() -> Self {
        Self {
            deck: Deck::standard().cards().to_vec(),
        }
    }

    pub fn next_hand<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Card> {
        let (picked, _) = self.deck.partial_shuffle(rng, FIXED_HAND_SIZE);
        picked.to_vec()
    }
}

impl Default for RandomHands {
    fn default() -> Self {
        Self::new()
    }
}

/// Spades, hearts, diamonds, clubs; high to low inside each suit.
pub fn sort_for_report(cards: &mut [Card]) {
    cards.sort_by(|a, b| b.cmp(a));
}

#[cfg(test)]
mod tests {
    use super::{RandomHands, sort_for_report};
    use ddhearts_core::model::card::parse_cards;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn hands_have_ten_distinct_cards() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut hands = RandomHands::new();
        for _ in 0..100 {
            let hand = hands.next_hand(&mut rng);
            assert_eq!(hand.len(), 10);
            assert_eq!(hand.iter().collect::<HashSet<_>>().len(), 10);
        }
    }

    #[test]
    fn consecutive_hands_differ() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut hands = RandomHands::new();
        let first = hands.next_hand(&mut rng);
        let second = hands.next_hand(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn report_order_is_suit_then_rank_descending() {
        let mut cards = parse_cards("C2 HA S3 DK CA SQ H2 D4 CT S2").unwrap();
        sort_for_report(&mut cards);
        let text: Vec<String> = cards.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            ["SQ", "S3", "S2", "HA", "H2", "DK", "D4", "CA", "CT", "C2"]
        );
    }
}
