//! Random completions of a partially known hand.

use crate::game::state::{GameError, GameState, HAND_SIZE};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::player::PlayerPosition;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

pub const FIXED_HAND_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoutError {
    FixedHandSize { found: usize },
    DuplicateCard(Card),
    Game(GameError),
}

impl fmt::Display for PlayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayoutError::FixedHandSize { found } => {
                write!(f, "fixed hand needs {FIXED_HAND_SIZE} cards, got {found}")
            }
            PlayoutError::DuplicateCard(card) => write!(f, "{card} appears twice in the fixed hand"),
            PlayoutError::Game(err) => write!(f, "playout failed: {err}"),
        }
    }
}

impl std::error::Error for PlayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayoutError::Game(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GameError> for PlayoutError {
    fn from(err: GameError) -> Self {
        PlayoutError::Game(err)
    }
}

/// A dealt game plus the seat that received the fixed cards.
#[derive(Debug, Clone)]
pub struct FixedDeal {
    pub game: GameState,
    pub target: PlayerPosition,
}

pub fn validate_fixed_hand(fixed: &[Card]) -> Result<(), PlayoutError> {
    if fixed.len() != FIXED_HAND_SIZE {
        return Err(PlayoutError::FixedHandSize { found: fixed.len() });
    }
    for (index, card) in fixed.iter().enumerate() {
        if fixed[..index].contains(card) {
            return Err(PlayoutError::DuplicateCard(*card));
        }
    }
    Ok(())
}

/// Deals the 42 unknown cards around `fixed`.
///
/// The target seat gets the fixed cards plus three random ones. Whichever hand
/// holds the two of clubs sits North; the others go to East, South and West in
/// random order.
pub fn deal_around_fixed<R: Rng + ?Sized>(
    fixed: &[Card],
    rng: &mut R,
) -> Result<FixedDeal, PlayoutError> {
    validate_fixed_hand(fixed)?;

    let mut rest = Deck::without(fixed);
    rest.shuffle_in_place(rng);
    let (extra, others) = rest.cards().split_at(HAND_SIZE - FIXED_HAND_SIZE);

    let mut open_seats = [
        PlayerPosition::East,
        PlayerPosition::South,
        PlayerPosition::West,
    ];
    open_seats.shuffle(rng);
    let mut open_seats = open_seats.to_vec();
    let mut seat_for = |cards: &[Card]| {
        if cards.contains(&Card::TWO_OF_CLUBS) {
            PlayerPosition::North
        } else {
            open_seats.pop().unwrap_or(PlayerPosition::North)
        }
    };

    let mut game = GameState::empty();
    let target_cards: Vec<Card> = fixed.iter().chain(extra).copied().collect();
    let target = seat_for(&target_cards);
    game.deal_fixed(target, target_cards)?;

    for hand in others.chunks(HAND_SIZE) {
        let seat = seat_for(hand);
        game.deal_fixed(seat, hand.iter().copied())?;
    }

    Ok(FixedDeal { game, target })
}

/// Plays `game` to the end with random legal tricks.
pub fn play_random_game<R: Rng + ?Sized>(game: &mut GameState, rng: &mut R) -> Result<(), GameError> {
    while !game.is_complete() {
        let trick = game.legal_trick_random(rng)?;
        game.play_trick(&trick)?;
    }
    Ok(())
}

/// One random deal and playout; returns the score of the seat holding `fixed`.
pub fn sample_fixed_hand_score<R: Rng + ?Sized>(
    fixed: &[Card],
    rng: &mut R,
) -> Result<i32, PlayoutError> {
    let FixedDeal { mut game, target } = deal_around_fixed(fixed, rng)?;
    play_random_game(&mut game, rng)?;
    Ok(game.scores().score(target))
}

#[cfg(test)]
mod tests {
    use super::{PlayoutError, deal_around_fixed, play_random_game, sample_fixed_hand_score};
    use crate::game::state::GameState;
    use crate::model::card::{Card, parse_cards};
    use crate::model::player::PlayerPosition;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn fixed_cards_stay_together_and_deck_is_partitioned() {
        let fixed = parse_cards("SQ SK SA HA HK H2 D3 D9 CT CJ").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let deal = deal_around_fixed(&fixed, &mut rng).unwrap();
            let hand = deal.game.hand(deal.target);
            assert_eq!(hand.len(), 13);
            assert!(fixed.iter().all(|card| hand.contains(*card)));

            let mut seen = HashSet::new();
            for seat in PlayerPosition::LOOP {
                assert_eq!(deal.game.hand(seat).len(), 13);
                seen.extend(deal.game.hand(seat).iter().copied());
            }
            assert_eq!(seen.len(), 52);
            assert_eq!(deal.game.two_of_clubs_holder(), Some(PlayerPosition::North));
        }
    }

    #[test]
    fn target_is_north_when_holding_two_of_clubs() {
        let fixed = parse_cards("C2 SK SA HA HK H2 D3 D9 CT CJ").unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let deal = deal_around_fixed(&fixed, &mut rng).unwrap();
        assert_eq!(deal.target, PlayerPosition::North);
    }

    #[test]
    fn target_seat_varies_without_two_of_clubs() {
        let fixed = parse_cards("S3 SK SA HA HK H2 D3 D9 CT CJ").unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let targets: HashSet<_> = (0..200)
            .map(|_| deal_around_fixed(&fixed, &mut rng).unwrap().target)
            .collect();
        assert!(targets.len() >= 3);
    }

    #[test]
    fn rejects_wrong_size_and_duplicates() {
        let mut rng = StdRng::seed_from_u64(1);
        let short = parse_cards("SQ SK").unwrap();
        assert_eq!(
            deal_around_fixed(&short, &mut rng).unwrap_err(),
            PlayoutError::FixedHandSize { found: 2 }
        );
        let doubled = parse_cards("SQ SQ SA HA HK H2 D3 D9 CT CJ").unwrap();
        assert_eq!(
            deal_around_fixed(&doubled, &mut rng).unwrap_err(),
            PlayoutError::DuplicateCard(Card::QUEEN_OF_SPADES)
        );
    }

    #[test]
    fn random_game_runs_to_completion() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut game = GameState::new_game(true, &mut rng);
        play_random_game(&mut game, &mut rng).unwrap();
        assert!(game.is_complete());
        assert!(game.points_remaining().is_empty());
    }

    #[test]
    fn sampled_scores_are_in_range() {
        let fixed = parse_cards("SQ SK SA HA HK H2 D3 D9 CT CJ").unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            let score = sample_fixed_hand_score(&fixed, &mut rng).unwrap();
            assert!((-52..=52).contains(&score), "score {score} out of range");
        }
    }
}
