use crate::model::card::Card;
use crate::model::player::PlayerPosition;

pub const MOON_POINTS: i32 = 26;

/// Final per-seat scores for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreSheet {
    totals: [i32; 4],
}

impl ScoreSheet {
    /// Scores the cards each seat captured.
    ///
    /// Each heart is one point and the queen of spades thirteen. A seat reaching 26
    /// shot the moon: it scores -26 and every other seat 0. The ten of clubs then
    /// doubles whatever its holder scored.
    pub fn from_captured(captured: &[Vec<Card>; 4]) -> Self {
        let mut totals = [0i32; 4];
        for seat in PlayerPosition::LOOP {
            totals[seat.index()] = raw_points(&captured[seat.index()]);
        }

        if let Some(shooter) = PlayerPosition::LOOP
            .into_iter()
            .find(|seat| totals[seat.index()] == MOON_POINTS)
        {
            totals = [0; 4];
            totals[shooter.index()] = -MOON_POINTS;
        }

        for seat in PlayerPosition::LOOP {
            if captured[seat.index()].contains(&Card::TEN_OF_CLUBS) {
                totals[seat.index()] *= 2;
            }
        }

        Self { totals }
    }

    pub fn score(&self, seat: PlayerPosition) -> i32 {
        self.totals[seat.index()]
    }

    pub fn totals(&self) -> &[i32; 4] {
        &self.totals
    }

    pub fn moon_shooter(&self) -> Option<PlayerPosition> {
        PlayerPosition::LOOP
            .into_iter()
            .find(|seat| self.totals[seat.index()] < 0)
    }
}

fn raw_points(cards: &[Card]) -> i32 {
    cards
        .iter()
        .map(|card| {
            if card.is_queen_of_spades() {
                13
            } else if card.is_heart() {
                1
            } else {
                0
            }
        })
        .sum()
}
