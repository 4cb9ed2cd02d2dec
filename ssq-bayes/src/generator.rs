use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use ssq_db::models::{Candidate, RED_PICK};

use crate::error::{PredictError, Result};
use crate::posterior::{BlueProbs, ProbabilityVector, RedProbs};

fn check_k(k: usize, n: usize) -> Result<()> {
    if k == 0 || k > n {
        return Err(PredictError::config(format!(
            "taille demandée {k} invalide pour {n} catégories"
        )));
    }
    Ok(())
}

/// Numéros triés par probabilité décroissante, égalités par numéro croissant.
fn ranked<const N: usize>(probs: &ProbabilityVector<N>) -> Vec<u8> {
    let mut indices: Vec<usize> = (0..N).collect();
    indices.sort_by(|&a, &b| probs.0[b].total_cmp(&probs.0[a]).then(a.cmp(&b)));
    indices.into_iter().map(|i| (i + 1) as u8).collect()
}

pub fn top_k<const N: usize>(probs: &ProbabilityVector<N>, k: usize) -> Result<Vec<u8>> {
    check_k(k, N)?;
    let mut numbers = ranked(probs);
    numbers.truncate(k);
    Ok(numbers)
}

/// Grille déterministe : 6 rouges et 1 bleu les plus probables.
pub fn top_candidate(red: &RedProbs, blue: &BlueProbs) -> Candidate {
    let mut reds = [0u8; RED_PICK];
    reds.copy_from_slice(&ranked(red)[..RED_PICK]);
    Candidate::new(reds, ranked(blue)[0])
}

/// Tirage pondéré sans remise de `k` numéros ; à chaque pas la masse restante
/// est renormalisée sur les numéros non encore choisis. Résultat trié.
pub fn sample_without_replacement<const N: usize, R: Rng + ?Sized>(
    probs: &ProbabilityVector<N>,
    k: usize,
    rng: &mut R,
) -> Result<Vec<u8>> {
    check_k(k, N)?;

    let mut available: Vec<(u8, f64)> = probs
        .0
        .iter()
        .enumerate()
        .map(|(i, &p)| ((i + 1) as u8, p))
        .collect();
    let mut selected = Vec::with_capacity(k);

    for _ in 0..k {
        let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| PredictError::config(format!("poids invalides : {e}")))?;
        let idx = dist.sample(rng);

        let (number, _) = available.remove(idx);
        selected.push(number);
    }

    selected.sort_unstable();
    Ok(selected)
}

pub fn sample_candidate<R: Rng + ?Sized>(
    red: &RedProbs,
    blue: &BlueProbs,
    rng: &mut R,
) -> Result<Candidate> {
    let reds = sample_without_replacement(red, RED_PICK, rng)?;
    let blue = sample_without_replacement(blue, 1, rng)?[0];

    let mut reds_arr = [0u8; RED_PICK];
    reds_arr.copy_from_slice(&reds);
    Ok(Candidate::new(reds_arr, blue))
}

/// `count` grilles tirées successivement sur la même source aléatoire.
/// Les doublons sont permis.
pub fn sample_pool<R: Rng + ?Sized>(
    red: &RedProbs,
    blue: &BlueProbs,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Candidate>> {
    if count == 0 {
        return Err(PredictError::config("num_sets doit être >= 1"));
    }
    (0..count)
        .map(|_| sample_candidate(red, blue, &mut *rng))
        .collect()
}
