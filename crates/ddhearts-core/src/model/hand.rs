use crate::model::card::Card;
use crate::model::suit::Suit;
use std::fmt;

/// The cards one seat holds, kept sorted by suit then rank with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandError {
    CardNotHeld(Card),
    Exhausted,
}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandError::CardNotHeld(card) => write!(f, "{card} is not held"),
            HandError::Exhausted => write!(f, "hand has no cards left"),
        }
    }
}

impl std::error::Error for HandError {}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.normalize();
        hand
    }

    /// Inserts `card`, returning false when it was already held.
    pub fn add(&mut self, card: Card) -> bool {
        match self.cards.binary_search(&card) {
            Ok(_) => false,
            Err(index) => {
                self.cards.insert(index, card);
                true
            }
        }
    }

    pub fn extend(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
        self.normalize();
    }

    pub fn remove(&mut self, card: Card) -> Result<Card, HandError> {
        match self.cards.binary_search(&card) {
            Ok(index) => Ok(self.cards.remove(index)),
            Err(_) => Err(HandError::CardNotHeld(card)),
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.binary_search(&card).is_ok()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|card| card.suit == suit)
    }

    pub fn only_hearts(&self) -> bool {
        self.cards.iter().all(|card| card.is_heart())
    }

    /// Distinct suits this hand may lead. Hearts are held back until broken
    /// unless nothing else is left.
    pub fn lead_suits(&self, hearts_broken: bool) -> Result<Vec<Suit>, HandError> {
        if self.cards.is_empty() {
            return Err(HandError::Exhausted);
        }
        let mut suits: Vec<Suit> = Suit::ALL
            .into_iter()
            .filter(|suit| self.has_suit(*suit))
            .collect();
        if !hearts_broken && suits.len() > 1 {
            suits.retain(|suit| !suit.is_heart());
        }
        Ok(suits)
    }

    /// Cards this hand may play.
    ///
    /// `lead` is the suit already led this trick, or `None` when the hand is on lead.
    /// On the first trick a void hand may not discard hearts or the queen of spades
    /// unless it holds nothing else.
    pub fn legal_plays(
        &self,
        lead: Option<Suit>,
        hearts_broken: bool,
        first_trick: bool,
    ) -> Result<Vec<Card>, HandError> {
        if self.cards.is_empty() {
            return Err(HandError::Exhausted);
        }

        let Some(suit) = lead else {
            let suits = self.lead_suits(hearts_broken)?;
            return Ok(self
                .cards
                .iter()
                .copied()
                .filter(|card| suits.contains(&card.suit))
                .collect());
        };

        let following: Vec<Card> = self.cards_of(suit).collect();
        if !following.is_empty() {
            return Ok(following);
        }

        if first_trick {
            let safe: Vec<Card> = self
                .cards
                .iter()
                .copied()
                .filter(|card| !card.is_first_trick_restricted())
                .collect();
            if !safe.is_empty() {
                return Ok(safe);
            }
        }

        Ok(self.cards.clone())
    }

    pub fn cards_of(&self, suit: Suit) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied().filter(move |card| card.suit == suit)
    }

    fn normalize(&mut self) {
        self.cards.sort();
        self.cards.dedup();
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, suit) in [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs]
            .into_iter()
            .enumerate()
        {
            if index > 0 {
                f.write_str("  ")?;
            }
            write!(f, "{suit}:")?;
            for card in self.cards.iter().rev().filter(|card| card.suit == suit) {
                write!(f, "{}", card.rank)?;
            }
        }
        Ok(())
    }
}
