pub mod history;
pub mod serialization;
pub mod state;

pub use history::{PlayedTrick, TrickHistory};
pub use serialization::DealSnapshot;
pub use state::{GameError, GameState, HAND_SIZE};
