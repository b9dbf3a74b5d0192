use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A playing card, written as suit letter followed by rank symbol (`SQ`, `CT`, `H2`).
///
/// Ordering is by suit, then rank, so ordered collections of cards group by suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const TWO_OF_CLUBS: Card = Card::new(Rank::Two, Suit::Clubs);
    pub const QUEEN_OF_SPADES: Card = Card::new(Rank::Queen, Suit::Spades);
    pub const TEN_OF_CLUBS: Card = Card::new(Rank::Ten, Suit::Clubs);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }

    pub const fn is_heart(self) -> bool {
        self.suit.is_heart()
    }

    pub const fn is_queen_of_spades(self) -> bool {
        matches!(self.rank, Rank::Queen) && matches!(self.suit, Suit::Spades)
    }

    pub const fn is_ten_of_clubs(self) -> bool {
        matches!(self.rank, Rank::Ten) && matches!(self.suit, Suit::Clubs)
    }

    /// Hearts, the queen of spades and the ten of clubs.
    pub const fn is_point_card(self) -> bool {
        self.is_heart() || self.is_queen_of_spades() || self.is_ten_of_clubs()
    }

    /// Cards that may not be discarded on the opening trick.
    pub const fn is_first_trick_restricted(self) -> bool {
        self.is_heart() || self.is_queen_of_spades()
    }

    pub fn point_cards() -> impl Iterator<Item = Card> {
        Rank::ORDERED
            .into_iter()
            .map(|rank| Card::new(rank, Suit::Hearts))
            .chain([Card::QUEEN_OF_SPADES, Card::TEN_OF_CLUBS])
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError {
    input: String,
}

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid card '{}': expected suit letter (S, H, D, C) followed by rank (2-9, T, J, Q, K, A)",
            self.input
        )
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(suit), Some(rank), None) => Suit::from_symbol(suit)
                .zip(Rank::from_symbol(rank))
                .map(|(suit, rank)| Card::new(rank, suit)),
            _ => None,
        };
        parsed.ok_or_else(|| ParseCardError {
            input: s.to_string(),
        })
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// Parses a comma or whitespace separated list such as `"SQ, HA CT"`.
pub fn parse_cards(text: &str) -> Result<Vec<Card>, ParseCardError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}
