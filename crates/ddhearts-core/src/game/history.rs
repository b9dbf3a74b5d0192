use crate::model::card::Card;
use crate::model::player::PlayerPosition;
use crate::model::trick::Trick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedTrick {
    pub trick: Trick,
    pub leader: PlayerPosition,
    pub winner: PlayerPosition,
}

/// Completed tricks in play order, each with the seat that led it and the seat that won it.
///
/// The current lead is the winner of the last trick, or the opening lead before any play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrickHistory {
    opening_lead: PlayerPosition,
    played: Vec<PlayedTrick>,
}

impl TrickHistory {
    pub fn new(opening_lead: PlayerPosition) -> Self {
        Self {
            opening_lead,
            played: Vec::with_capacity(13),
        }
    }

    pub fn lead(&self) -> PlayerPosition {
        self.played
            .last()
            .map(|played| played.winner)
            .unwrap_or(self.opening_lead)
    }

    pub fn is_first_trick(&self) -> bool {
        self.played.is_empty()
    }

    pub fn len(&self) -> usize {
        self.played.len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }

    pub fn played(&self) -> &[PlayedTrick] {
        &self.played
    }

    pub fn leaders(&self) -> impl Iterator<Item = PlayerPosition> + '_ {
        self.played.iter().map(|played| played.leader)
    }

    /// Records `trick` as led by `leader` and returns the seat that won it.
    pub fn record(&mut self, trick: Trick, leader: PlayerPosition) -> PlayerPosition {
        let winner = trick.winner(leader);
        self.played.push(PlayedTrick {
            trick,
            leader,
            winner,
        });
        winner
    }

    pub fn pop(&mut self) -> Option<PlayedTrick> {
        self.played.pop()
    }

    pub fn hearts_played(&self) -> bool {
        self.played
            .iter()
            .any(|played| played.trick.cards().iter().any(|card| card.is_heart()))
    }

    /// Cards each seat has taken, indexed by seat.
    pub fn captured(&self) -> [Vec<Card>; 4] {
        let mut captured: [Vec<Card>; 4] = Default::default();
        for played in &self.played {
            captured[played.winner.index()].extend_from_slice(played.trick.cards());
        }
        captured
    }
}
