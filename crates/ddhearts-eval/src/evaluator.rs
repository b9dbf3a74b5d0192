//! Monte Carlo strength estimate for a partially known hand.

use ddhearts_core::model::card::Card;
use ddhearts_core::playout::{PlayoutError, sample_fixed_hand_score, validate_fixed_hand};
use rand::Rng;
use statrs::statistics::Statistics;
use thiserror::Error;

/// Fewest playouts that still give a sample standard deviation.
pub const MIN_SAMPLES: usize = 2;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("at least {MIN_SAMPLES} samples are required, got {samples}")]
    SampleCount { samples: usize },
    #[error(transparent)]
    Playout(#[from] PlayoutError),
}

/// Mean and sample (N-1) standard deviation of the seat's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandEvaluation {
    pub mean: f64,
    pub stddev: f64,
    pub samples: usize,
}

impl HandEvaluation {
    pub fn from_scores(scores: &[f64]) -> Self {
        Self {
            mean: scores.mean(),
            stddev: scores.std_dev(),
            samples: scores.len(),
        }
    }
}

/// One evaluated hand as it leaves a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct HandStatistics {
    pub hand_index: usize,
    pub hand: Vec<Card>,
    pub mean: f64,
    pub stddev: f64,
}

impl HandStatistics {
    pub fn new(hand_index: usize, hand: Vec<Card>, evaluation: HandEvaluation) -> Self {
        Self {
            hand_index,
            hand,
            mean: evaluation.mean,
            stddev: evaluation.stddev,
        }
    }
}

/// Deals the other 42 cards at random `samples` times around `hand`, plays
/// each deal out randomly and summarizes the holder's scores.
pub fn evaluate_fixed_hand<R: Rng + ?Sized>(
    hand: &[Card],
    samples: usize,
    rng: &mut R,
) -> Result<HandEvaluation, EvalError> {
    if samples < MIN_SAMPLES {
        return Err(EvalError::SampleCount { samples });
    }
    validate_fixed_hand(hand)?;

    let mut scores = Vec::with_capacity(samples);
    for _ in 0..samples {
        scores.push(f64::from(sample_fixed_hand_score(hand, rng)?));
    }
    Ok(HandEvaluation::from_scores(&scores))
}
