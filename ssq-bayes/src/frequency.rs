use serde::{Serialize, Serializer};
use ssq_db::models::{DrawRecord, Pool, BLUE_POOL_SIZE, RED_POOL_SIZE};

use crate::error::{PredictError, Result};
use crate::weighting::WeightedDraw;

/// Comptes pondérés, indexés par (numéro - 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountVector<const N: usize>(pub [f64; N]);

pub type RedCounts = CountVector<RED_POOL_SIZE>;
pub type BlueCounts = CountVector<BLUE_POOL_SIZE>;

impl<const N: usize> CountVector<N> {
    pub fn zeros() -> Self {
        Self([0.0; N])
    }

    /// Compte du numéro `number` (1-based).
    pub fn get(&self, number: u8) -> f64 {
        self.0[(number - 1) as usize]
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    fn add(&mut self, number: u8, weight: f64) {
        self.0[(number - 1) as usize] += weight;
    }
}

impl<const N: usize> Serialize for CountVector<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Contrôle chaque tirage ; le premier défaut interrompt tout.
pub fn validate_history<'a>(draws: impl IntoIterator<Item = &'a DrawRecord>) -> Result<()> {
    for draw in draws {
        draw.validate().map_err(|defect| PredictError::Data {
            sequence_index: draw.sequence_index,
            defect,
        })?;
    }
    Ok(())
}

/// Accumule le poids de chaque tirage sur ses 6 rouges et son bleu.
/// Un seul tirage invalide fait échouer l'ensemble : rien n'est ignoré.
pub fn count_frequencies(history: &[WeightedDraw<'_>]) -> Result<(RedCounts, BlueCounts)> {
    validate_history(history.iter().map(|wd| wd.draw))?;

    let mut red = RedCounts::zeros();
    let mut blue = BlueCounts::zeros();

    for wd in history {
        for &n in Pool::Red.numbers_from(wd.draw) {
            red.add(n, wd.weight);
        }
        for &n in Pool::Blue.numbers_from(wd.draw) {
            blue.add(n, wd.weight);
        }
    }

    Ok((red, blue))
}
