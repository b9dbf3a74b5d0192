use crate::game::history::{PlayedTrick, TrickHistory};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::{Hand, HandError};
use crate::model::player::PlayerPosition;
use crate::model::score::ScoreSheet;
use crate::model::suit::Suit;
use crate::model::trick::Trick;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::{array, fmt};

pub const HAND_SIZE: usize = 13;

/// Four hands, the tricks played so far and the point cards still out.
///
/// Playing a trick and undoing it are exact inverses, so a search can walk the
/// game tree on a single mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    hands: [Hand; 4],
    history: TrickHistory,
    points_remaining: BTreeSet<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    Hand {
        seat: PlayerPosition,
        error: HandError,
    },
    DuplicateCard(Card),
    Overdealt {
        seat: PlayerPosition,
        count: usize,
    },
    NothingToUndo,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Hand { seat, error } => write!(f, "{seat}: {error}"),
            GameError::DuplicateCard(card) => write!(f, "{card} has already been dealt"),
            GameError::Overdealt { seat, count } => {
                write!(f, "{seat} would hold {count} cards (max {HAND_SIZE})")
            }
            GameError::NothingToUndo => write!(f, "no trick has been played"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Hand { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl GameState {
    /// Empty hands with every point card still to be played.
    pub fn empty() -> Self {
        Self {
            hands: array::from_fn(|_| Hand::new()),
            history: TrickHistory::new(PlayerPosition::North),
            points_remaining: Card::point_cards().collect(),
        }
    }

    /// A fresh game. When `deal` is set the deck is shuffled with `rng` and the
    /// two of clubs always lands with North.
    pub fn new_game<R: Rng + ?Sized>(deal: bool, rng: &mut R) -> Self {
        let mut game = Self::empty();
        if deal {
            game.hands[PlayerPosition::North.index()].add(Card::TWO_OF_CLUBS);
            game.fill_hands(rng);
        }
        game
    }

    /// A constructed position. Only point cards present in `hands` count as
    /// outstanding, so partial deals finish once their cards run out.
    pub fn with_hands(hands: [Hand; 4]) -> Self {
        let points_remaining = hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .filter(|card| card.is_point_card())
            .collect();
        Self {
            hands,
            history: TrickHistory::new(PlayerPosition::North),
            points_remaining,
        }
    }

    /// Gives `cards` to `seat`. Fails without changing anything if a card is
    /// already dealt or the seat would exceed thirteen cards.
    pub fn deal_fixed(
        &mut self,
        seat: PlayerPosition,
        cards: impl IntoIterator<Item = Card>,
    ) -> Result<(), GameError> {
        let mut incoming: Vec<Card> = Vec::new();
        for card in cards {
            if incoming.contains(&card) || self.is_dealt(card) {
                return Err(GameError::DuplicateCard(card));
            }
            incoming.push(card);
        }

        let count = self.hands[seat.index()].len() + incoming.len();
        if count > HAND_SIZE {
            return Err(GameError::Overdealt { seat, count });
        }

        self.hands[seat.index()].extend(incoming);
        Ok(())
    }

    /// Shuffles every card not yet dealt and tops each seat up to thirteen.
    pub fn deal_random_remainder<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.fill_hands(rng);
    }

    fn fill_hands<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let dealt: Vec<Card> = self
            .hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .chain(self.played_cards())
            .collect();
        let mut deck = Deck::without(&dealt);
        deck.shuffle_in_place(rng);

        let mut remaining = deck.cards().iter().copied();
        for hand in self.hands.iter_mut() {
            let missing = HAND_SIZE.saturating_sub(hand.len());
            hand.extend(remaining.by_ref().take(missing));
        }
    }

    fn is_dealt(&self, card: Card) -> bool {
        self.hands.iter().any(|hand| hand.contains(card))
            || self.played_cards().any(|played| played == card)
    }

    fn played_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.history
            .played()
            .iter()
            .flat_map(|played| played.trick.cards().iter().copied())
    }

    pub fn hand(&self, seat: PlayerPosition) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn hands(&self) -> &[Hand; 4] {
        &self.hands
    }

    pub fn history(&self) -> &TrickHistory {
        &self.history
    }

    pub fn points_remaining(&self) -> &BTreeSet<Card> {
        &self.points_remaining
    }

    pub fn tricks_played(&self) -> usize {
        self.history.len()
    }

    pub fn hearts_broken(&self) -> bool {
        self.history.hearts_played()
    }

    pub fn two_of_clubs_holder(&self) -> Option<PlayerPosition> {
        PlayerPosition::LOOP
            .into_iter()
            .find(|seat| self.hands[seat.index()].contains(Card::TWO_OF_CLUBS))
    }

    /// The opening trick of a deal: nothing played yet and the two of clubs in hand.
    pub fn is_first_trick(&self) -> bool {
        self.history.is_first_trick() && self.two_of_clubs_holder().is_some()
    }

    pub fn current_lead(&self) -> PlayerPosition {
        if self.history.is_first_trick()
            && let Some(holder) = self.two_of_clubs_holder()
        {
            return holder;
        }
        self.history.lead()
    }

    /// All point cards are gone, or nobody has anything left to play.
    pub fn is_complete(&self) -> bool {
        self.points_remaining.is_empty() || self.hands.iter().all(Hand::is_empty)
    }

    pub fn scores(&self) -> ScoreSheet {
        ScoreSheet::from_captured(&self.history.captured())
    }

    fn seat_plays(
        &self,
        seat: PlayerPosition,
        lead: Option<Suit>,
        first_trick: bool,
    ) -> Result<Vec<Card>, GameError> {
        self.hands[seat.index()]
            .legal_plays(lead, self.hearts_broken(), first_trick)
            .map_err(|error| GameError::Hand { seat, error })
    }

    /// Every distinct legal trick from this position.
    ///
    /// For each suit the lead seat may open, the product of each seat's legal
    /// cards in that suit. On the first trick the two of clubs is forced.
    pub fn legal_tricks(&self) -> Result<Vec<Trick>, GameError> {
        let lead = self.current_lead();

        if self.is_first_trick() {
            let mut options: [Vec<Card>; 4] = Default::default();
            for seat in PlayerPosition::LOOP {
                options[seat.index()] = if seat == lead {
                    vec![Card::TWO_OF_CLUBS]
                } else {
                    self.seat_plays(seat, Some(Suit::Clubs), true)?
                };
            }
            return Ok(cartesian_tricks(&options));
        }

        let suits = self.hands[lead.index()]
            .lead_suits(self.hearts_broken())
            .map_err(|error| GameError::Hand { seat: lead, error })?;

        let mut tricks = Vec::new();
        for suit in suits {
            let mut options: [Vec<Card>; 4] = Default::default();
            for seat in PlayerPosition::LOOP {
                options[seat.index()] = self.seat_plays(seat, Some(suit), false)?;
            }
            tricks.extend(cartesian_tricks(&options));
        }
        Ok(tricks)
    }

    /// One random legal trick: a random lead, then a uniformly random legal follow from each other seat.
    ///
    /// Before hearts are broken the leader picks a legal suit uniformly and then
    /// a card of that suit, so a single diamond among four spades is led half the
    /// time. Once hearts are broken every held card is equally likely.
    pub fn legal_trick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Trick, GameError> {
        let lead = self.current_lead();
        let first_trick = self.is_first_trick();

        let lead_card = if first_trick {
            Card::TWO_OF_CLUBS
        } else if self.hearts_broken() {
            choose(&self.seat_plays(lead, None, false)?, lead, rng)?
        } else {
            let hand = &self.hands[lead.index()];
            let suit = hand
                .lead_suits(false)
                .map_err(|error| GameError::Hand { seat: lead, error })?
                .choose(rng)
                .copied()
                .ok_or(GameError::Hand {
                    seat: lead,
                    error: HandError::Exhausted,
                })?;
            choose(&hand.cards_of(suit).collect::<Vec<_>>(), lead, rng)?
        };

        let mut cards = [lead_card; 4];
        for seat in PlayerPosition::LOOP {
            if seat != lead {
                let options = self.seat_plays(seat, Some(lead_card.suit), first_trick)?;
                cards[seat.index()] = choose(&options, seat, rng)?;
            }
        }
        Ok(Trick::new(cards))
    }

    /// Resolves `trick` (already known to be legal) and returns its winner.
    ///
    /// Every card is checked before any is removed, so a rejected trick leaves
    /// the state untouched.
    pub fn play_trick(&mut self, trick: &Trick) -> Result<PlayerPosition, GameError> {
        for (seat, card) in trick.plays() {
            if !self.hands[seat.index()].contains(card) {
                return Err(GameError::Hand {
                    seat,
                    error: HandError::CardNotHeld(card),
                });
            }
        }

        let leader = self.current_lead();
        for (seat, card) in trick.plays() {
            self.hands[seat.index()]
                .remove(card)
                .map_err(|error| GameError::Hand { seat, error })?;
            self.points_remaining.remove(&card);
        }
        Ok(self.history.record(*trick, leader))
    }

    /// Takes back the most recent trick, restoring hands, point cards and lead.
    pub fn undo_last_trick(&mut self) -> Result<PlayedTrick, GameError> {
        let played = self.history.pop().ok_or(GameError::NothingToUndo)?;
        for (seat, card) in played.trick.plays() {
            self.hands[seat.index()].add(card);
            if card.is_point_card() {
                self.points_remaining.insert(card);
            }
        }
        Ok(played)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seat in PlayerPosition::LOOP {
            writeln!(f, "{}: {}", seat.letter(), self.hand(seat))?;
        }
        write!(
            f,
            "tricks: {}  lead: {}  hearts broken: {}  complete: {}",
            self.tricks_played(),
            self.current_lead(),
            self.hearts_broken(),
            self.is_complete()
        )
    }
}

fn choose<R: Rng + ?Sized>(
    options: &[Card],
    seat: PlayerPosition,
    rng: &mut R,
) -> Result<Card, GameError> {
    options.choose(rng).copied().ok_or(GameError::Hand {
        seat,
        error: HandError::Exhausted,
    })
}

fn cartesian_tricks(options: &[Vec<Card>; 4]) -> Vec<Trick> {
    let [north, east, south, west] = options;
    let mut tricks = Vec::with_capacity(north.len() * east.len() * south.len() * west.len());
    for &n in north {
        for &e in east {
            for &s in south {
                for &w in west {
                    tricks.push(Trick::new([n, e, s, w]));
                }
            }
        }
    }
    tricks
}
