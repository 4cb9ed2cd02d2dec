use serde::{Serialize, Serializer};
use ssq_db::models::{BLUE_POOL_SIZE, RED_POOL_SIZE};

use crate::config::check_alpha;
use crate::error::Result;
use crate::frequency::CountVector;

/// Moyenne a posteriori, indexée par (numéro - 1). Somme = 1, entrées > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityVector<const N: usize>(pub [f64; N]);

pub type RedProbs = ProbabilityVector<RED_POOL_SIZE>;
pub type BlueProbs = ProbabilityVector<BLUE_POOL_SIZE>;

impl<const N: usize> ProbabilityVector<N> {
    pub fn uniform() -> Self {
        Self([1.0 / N as f64; N])
    }

    pub fn get(&self, number: u8) -> f64 {
        self.0[(number - 1) as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl<const N: usize> Serialize for ProbabilityVector<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// p_i = (count_i + alpha) / sum_j (count_j + alpha), prior de Dirichlet symétrique.
///
/// Les termes sont d'abord ramenés à l'échelle du plus grand (chaque terme <= 2),
/// ce qui évite le débordement de la somme pour un alpha ou des comptes énormes.
pub fn posterior_mean<const N: usize>(
    counts: &CountVector<N>,
    alpha: f64,
) -> Result<ProbabilityVector<N>> {
    check_alpha("alpha", alpha)?;

    let scale = counts.0.iter().fold(alpha, |m, &c| m.max(c));
    let mut probs = [0.0f64; N];
    for (p, &c) in probs.iter_mut().zip(counts.0.iter()) {
        *p = c / scale + alpha / scale;
    }
    let denominator: f64 = probs.iter().sum();
    for p in &mut probs {
        *p /= denominator;
    }

    Ok(ProbabilityVector(probs))
}
