use super::state::{GameError, GameState};
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::player::PlayerPosition;
use serde::{Deserialize, Serialize};

/// The four hands of a position before any trick is played, e.g.
/// `{"north": ["C2", "SQ", ...], "east": [...], ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealSnapshot {
    pub north: Vec<Card>,
    pub east: Vec<Card>,
    pub south: Vec<Card>,
    pub west: Vec<Card>,
}

impl DealSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let cards = |seat: PlayerPosition| state.hand(seat).cards().to_vec();
        DealSnapshot {
            north: cards(PlayerPosition::North),
            east: cards(PlayerPosition::East),
            south: cards(PlayerPosition::South),
            west: cards(PlayerPosition::West),
        }
    }

    /// Rebuilds the position, rejecting any card listed twice.
    ///
    /// A full 52-card deal tracks all fifteen point cards; a partial deal only
    /// the point cards it contains.
    pub fn restore(&self) -> Result<GameState, GameError> {
        let mut scratch = GameState::empty();
        for (seat, cards) in self.seats() {
            scratch.deal_fixed(seat, cards.iter().copied())?;
        }
        let hands = PlayerPosition::LOOP.map(|seat| Hand::with_cards(self.cards(seat).to_vec()));
        Ok(GameState::with_hands(hands))
    }

    pub fn cards(&self, seat: PlayerPosition) -> &[Card] {
        match seat {
            PlayerPosition::North => &self.north,
            PlayerPosition::East => &self.east,
            PlayerPosition::South => &self.south,
            PlayerPosition::West => &self.west,
        }
    }

    fn seats(&self) -> impl Iterator<Item = (PlayerPosition, &[Card])> {
        PlayerPosition::LOOP
            .into_iter()
            .map(move |seat| (seat, self.cards(seat)))
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::DealSnapshot;
    use crate::game::state::{GameError, GameState};
    use crate::model::card::Card;
    use crate::model::player::PlayerPosition;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn snapshot_serializes_cards_as_notation() {
        let mut rng = StdRng::seed_from_u64(99);
        let state = GameState::new_game(true, &mut rng);
        let json = DealSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"C2\""));
        assert!(json.contains("\"north\""));
    }

    #[test]
    fn snapshot_roundtrip_restores_full_deal() {
        let mut rng = StdRng::seed_from_u64(123);
        let state = GameState::new_game(true, &mut rng);
        let json = DealSnapshot::to_json(&state).unwrap();
        let restored = DealSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn partial_snapshot_tracks_only_its_point_cards() {
        let json = r#"{
            "north": ["C2", "H3"],
            "east": ["C3", "D4"],
            "south": ["C4", "SQ"],
            "west": ["C5", "D9"]
        }"#;
        let state = DealSnapshot::from_json(json).unwrap().restore().unwrap();
        assert_eq!(state.points_remaining().len(), 2);
        assert_eq!(state.two_of_clubs_holder(), Some(PlayerPosition::North));
    }

    #[test]
    fn duplicate_cards_are_rejected() {
        let json = r#"{"north": ["SQ"], "east": ["SQ"], "south": [], "west": []}"#;
        let snapshot = DealSnapshot::from_json(json).unwrap();
        assert_eq!(
            snapshot.restore(),
            Err(GameError::DuplicateCard(Card::QUEEN_OF_SPADES))
        );
    }

    #[test]
    fn malformed_card_fails_to_parse() {
        let json = r#"{"north": ["Q♠"], "east": [], "south": [], "west": []}"#;
        assert!(DealSnapshot::from_json(json).is_err());
    }
}
