use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::suit::Suit;
use std::fmt;

/// One complete round of play, one card per seat in North, East, South, West order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trick {
    cards: [Card; 4],
}

impl Trick {
    pub const fn new(cards: [Card; 4]) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card; 4] {
        &self.cards
    }

    pub fn card(&self, seat: PlayerPosition) -> Card {
        self.cards[seat.index()]
    }

    pub fn plays(&self) -> impl Iterator<Item = (PlayerPosition, Card)> + '_ {
        PlayerPosition::LOOP.into_iter().zip(self.cards.iter().copied())
    }

    pub fn lead_suit(&self, leader: PlayerPosition) -> Suit {
        self.card(leader).suit
    }

    /// Highest card of the suit played by `leader`; off-suit cards never win.
    pub fn winner(&self, leader: PlayerPosition) -> PlayerPosition {
        let suit = self.lead_suit(leader);
        self.plays()
            .filter(|(_, card)| card.suit == suit)
            .max_by_key(|(_, card)| card.rank)
            .map(|(seat, _)| seat)
            .unwrap_or(leader)
    }

    pub fn point_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied().filter(|card| card.is_point_card())
    }
}

impl fmt::Display for Trick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [north, east, south, west] = self.cards;
        write!(f, "({north} {east} {south} {west})")
    }
}

#[cfg(test)]
mod tests {
    use super::Trick;
    use crate::model::card::{Card, parse_cards};
    use crate::model::player::PlayerPosition;

    fn trick(text: &str) -> Trick {
        let cards = parse_cards(text).unwrap();
        Trick::new([cards[0], cards[1], cards[2], cards[3]])
    }

    #[test]
    fn winner_is_highest_card_of_lead_suit() {
        let trick = trick("CT CQ C4 SA");
        assert_eq!(trick.winner(PlayerPosition::North), PlayerPosition::East);
    }

    #[test]
    fn lead_seat_defines_the_suit() {
        let trick = trick("CA D3 DK D9");
        assert_eq!(trick.winner(PlayerPosition::East), PlayerPosition::South);
        assert_eq!(trick.winner(PlayerPosition::North), PlayerPosition::North);
    }

    #[test]
    fn point_cards_are_listed() {
        let trick = trick("C2 SQ H4 CT");
        let points: Vec<Card> = trick.point_cards().collect();
        assert_eq!(points.len(), 3);
        assert!(points.contains(&Card::QUEEN_OF_SPADES));
    }

    #[test]
    fn display_lists_cards_in_seat_order() {
        assert_eq!(trick("C2 C3 C4 C5").to_string(), "(C2 C3 C4 C5)");
    }
}
