//! Exhaustive double-dummy enumeration.
//!
//! Walks every legal sequence of tricks from a position to the end of the hand
//! using an explicit stack of candidate lists, one per depth, and a single
//! mutable [`GameState`] that is advanced with `play_trick` and rewound with
//! `undo_last_trick`. There is no pruning or evaluation here; callers attach
//! whatever they need through the leaf visitor.

use crate::game::state::{GameError, GameState};
use crate::model::trick::Trick;
use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Terminal positions visited.
    pub leaves: u64,
    /// Tricks applied (each one is undone again before returning).
    pub tricks_played: u64,
    pub max_depth: usize,
    /// False when the visitor stopped the walk early.
    pub completed: bool,
}

/// Visits every leaf reachable from `game`, depth first, trying the last
/// generated candidate at each depth first.
///
/// The visitor sees each finished position exactly once and may return
/// `ControlFlow::Break(())` to stop. `game` is back in its starting position
/// when this returns, including when trick generation fails part way down.
pub fn run_exhaustive_search<F>(game: &mut GameState, mut visit: F) -> Result<SearchStats, GameError>
where
    F: FnMut(&GameState) -> ControlFlow<()>,
{
    let mut stats = SearchStats::default();
    let mut stack: Vec<Option<Vec<Trick>>> = vec![None];

    while !stack.is_empty() {
        let depth = stack.len() - 1;
        let frame = &mut stack[depth];
        if frame.is_none() {
            if game.is_complete() {
                stats.leaves += 1;
                if visit(game).is_break() {
                    unwind(game, depth)?;
                    return Ok(stats);
                }
                *frame = Some(Vec::new());
            } else {
                match game.legal_tricks() {
                    Ok(tricks) => *frame = Some(tricks),
                    Err(err) => return abandon(game, depth, err),
                }
            }
        }

        let next = frame.as_mut().and_then(Vec::pop);
        match next {
            Some(trick) => {
                if let Err(err) = game.play_trick(&trick) {
                    return abandon(game, depth, err);
                }
                stats.tricks_played += 1;
                stack.push(None);
                stats.max_depth = stats.max_depth.max(depth + 1);
            }
            None => {
                stack.pop();
                if depth > 0 {
                    game.undo_last_trick()?;
                }
            }
        }
    }

    stats.completed = true;
    Ok(stats)
}

/// Number of complete play-throughs from `game`.
pub fn count_leaves(game: &mut GameState) -> Result<u64, GameError> {
    run_exhaustive_search(game, |_| ControlFlow::Continue(())).map(|stats| stats.leaves)
}

fn unwind(game: &mut GameState, depth: usize) -> Result<(), GameError> {
    for _ in 0..depth {
        game.undo_last_trick()?;
    }
    Ok(())
}

/// Rewinds the `depth` tricks applied so far, then reports `err`.
fn abandon<T>(game: &mut GameState, depth: usize, err: GameError) -> Result<T, GameError> {
    unwind(game, depth)?;
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::{count_leaves, run_exhaustive_search};
    use crate::game::state::{GameError, GameState};
    use crate::model::card::parse_cards;
    use crate::model::hand::{Hand, HandError};
    use crate::model::player::PlayerPosition;
    use crate::model::trick::Trick;
    use std::collections::HashSet;
    use std::ops::ControlFlow;

    fn game(north: &str, east: &str, south: &str, west: &str) -> GameState {
        GameState::with_hands(
            [north, east, south, west].map(|text| Hand::with_cards(parse_cards(text).unwrap())),
        )
    }

    #[test]
    fn finished_position_is_a_single_leaf() {
        let mut finished = game("S2", "", "", "");
        assert!(finished.is_complete());
        assert_eq!(count_leaves(&mut finished).unwrap(), 1);
    }

    #[test]
    fn forced_lines_have_one_leaf() {
        // Every play is forced: clubs are followed, then West can only lead H9.
        let mut game = game("C2 C6", "C3 C7", "C4 C8", "C5 H9");
        let before = game.clone();
        let stats = run_exhaustive_search(&mut game, |_| ControlFlow::Continue(())).unwrap();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.max_depth, 2);
        assert!(stats.completed);
        assert_eq!(game, before);
    }

    #[test]
    fn leaf_count_matches_branching_product() {
        let mut game = game("C2 SA S9", "D3 D4 H2", "C3 C4 D8", "C5 D6 H7");
        let before = game.clone();
        let mut seen = HashSet::new();
        let stats = run_exhaustive_search(&mut game, |leaf| {
            let line: Vec<Trick> = leaf.history().played().iter().map(|p| p.trick).collect();
            assert!(seen.insert(line), "leaf visited twice");
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(stats.leaves, expected_leaves());
        assert_eq!(stats.max_depth, 3);
        assert_eq!(game, before);
    }

    /// Branching of the deal above, counted by hand.
    fn expected_leaves() -> u64 {
        // Trick 1: North leads C2. East is void and may not discard H2 yet (D3 or D4),
        // South follows with C3 or C4, West has only C5 and wins.
        let first = 2 * 2;
        // Trick 2: hearts are unbroken so West leads D6. North discards SA or S9,
        // East and South follow with their single diamond. South's D8 wins.
        let second = 2;
        // Trick 3: one card left everywhere.
        let third = 1;
        first * second * third
    }

    #[test]
    fn visitor_can_stop_early_and_state_is_restored() {
        let mut game = game("C2 SA S9", "D3 D4 H2", "C3 C4 D8", "C5 D6 H7");
        let before = game.clone();
        let mut visits = 0;
        let stats = run_exhaustive_search(&mut game, |_| {
            visits += 1;
            if visits == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(stats.leaves, 3);
        assert!(!stats.completed);
        assert_eq!(game, before);
    }

    #[test]
    fn first_leaf_follows_the_last_candidate_at_every_depth() {
        let mut game = game("C2 SA S9", "D3 D4 H2", "C3 C4 D8", "C5 D6 H7");
        let start = game.clone();
        let mut first_line = Vec::new();
        run_exhaustive_search(&mut game, |leaf| {
            first_line = leaf.history().played().iter().map(|p| p.trick).collect();
            ControlFlow::Break(())
        })
        .unwrap();
        assert_eq!(first_line.len(), 3);

        let mut replay = start;
        for trick in &first_line {
            let candidates = replay.legal_tricks().unwrap();
            assert_eq!(candidates.last(), Some(trick));
            replay.play_trick(trick).unwrap();
        }
        assert!(replay.is_complete());
    }

    #[test]
    fn generation_error_below_the_root_restores_the_state() {
        // After the opening trick West wins and has nothing left to lead while H9
        // is still out.
        let mut game = game("C2 H9", "C3", "C4", "C6");
        let before = game.clone();
        let err = count_leaves(&mut game).unwrap_err();
        assert_eq!(
            err,
            GameError::Hand {
                seat: PlayerPosition::West,
                error: HandError::Exhausted,
            }
        );
        assert_eq!(game, before);
    }
}
