//! Re-sélection « à la Nash » : chaque grille du pool est évaluée comme meilleure
//! réponse face aux autres, en arbitrant vraisemblance et recouvrement.

use rayon::prelude::*;
use serde::Serialize;
use ssq_db::models::Candidate;
use tracing::info;

use crate::config::check_beta;
use crate::error::{PredictError, Result};
use crate::posterior::{BlueProbs, RedProbs};

/// Une collision sur le bleu compte double : un seul emplacement bleu.
pub const BLUE_COLLISION_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateScore {
    pub log_likelihood: f64,
    pub penalty: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    pub winner_index: usize,
    pub winner: Candidate,
    pub score: f64,
    pub scores: Vec<CandidateScore>,
}

pub fn log_likelihood(candidate: &Candidate, red: &RedProbs, blue: &BlueProbs) -> f64 {
    candidate.reds.iter().map(|&r| red.get(r).ln()).sum::<f64>() + blue.get(candidate.blue).ln()
}

/// Pénalité de recouvrement du candidat `i` face au reste du pool :
/// -ln p pour chaque rouge partagé (un numéro « chaud » coûte plus cher),
/// et 2 × -ln p pour chaque bleu identique.
pub fn overlap_penalty(pool: &[Candidate], i: usize, red: &RedProbs, blue: &BlueProbs) -> f64 {
    let me = &pool[i];
    let mut red_penalty = 0.0f64;
    let mut blue_penalty = 0.0f64;

    for (j, other) in pool.iter().enumerate() {
        if j == i {
            continue;
        }
        for &r in me.reds.iter().filter(|r| other.reds.contains(r)) {
            red_penalty += -red.get(r).ln();
        }
        if other.blue == me.blue {
            blue_penalty += -blue.get(me.blue).ln();
        }
    }

    red_penalty + BLUE_COLLISION_FACTOR * blue_penalty
}

/// Score_i = LL_i - beta × pénalité_i ; le meilleur score gagne, à égalité le plus petit indice.
pub fn nash_select(
    pool: &[Candidate],
    red: &RedProbs,
    blue: &BlueProbs,
    beta: f64,
) -> Result<SelectionResult> {
    check_beta(beta)?;
    if pool.is_empty() {
        return Err(PredictError::config("pool de candidats vide"));
    }
    for (index, c) in pool.iter().enumerate() {
        c.validate()
            .map_err(|defect| PredictError::Candidate { index, defect })?;
    }

    let scores: Vec<CandidateScore> = (0..pool.len())
        .into_par_iter()
        .map(|i| {
            let log_likelihood = log_likelihood(&pool[i], red, blue);
            let penalty = overlap_penalty(pool, i, red, blue);
            CandidateScore {
                log_likelihood,
                penalty,
                score: log_likelihood - beta * penalty,
            }
        })
        .collect();

    let mut winner_index = 0;
    for (i, s) in scores.iter().enumerate().skip(1) {
        if s.score > scores[winner_index].score {
            winner_index = i;
        }
    }

    let score = scores[winner_index].score;
    info!(
        pool = pool.len(),
        beta,
        winner = winner_index + 1,
        score,
        "re-sélection terminée"
    );

    Ok(SelectionResult {
        winner_index,
        winner: pool[winner_index],
        score,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posterior::ProbabilityVector;

    fn c(reds: [u8; 6], blue: u8) -> Candidate {
        Candidate::new(reds, blue)
    }

    fn skewed_red() -> RedProbs {
        let mut raw = [0.0f64; 33];
        for (i, p) in raw.iter_mut().enumerate() {
            *p = 1.0 + i as f64;
        }
        let total: f64 = raw.iter().sum();
        ProbabilityVector(raw.map(|p| p / total))
    }

    #[test]
    fn test_single_candidate() {
        let pool = vec![c([1, 2, 3, 4, 5, 6], 1)];
        let res = nash_select(&pool, &RedProbs::uniform(), &BlueProbs::uniform(), 0.5).unwrap();
        assert_eq!(res.winner_index, 0);
        assert_eq!(res.scores[0].penalty, 0.0);
        let expected = 6.0 * (1.0f64 / 33.0).ln() + (1.0f64 / 16.0).ln();
        assert!((res.score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_beta_zero_is_max_likelihood() {
        let red = skewed_red();
        let blue = BlueProbs::uniform();
        let pool = vec![
            c([1, 2, 3, 4, 5, 6], 1),
            c([28, 29, 30, 31, 32, 33], 2),
            c([28, 29, 30, 31, 32, 33], 3),
            c([10, 11, 12, 13, 14, 15], 4),
        ];
        let res = nash_select(&pool, &red, &blue, 0.0).unwrap();
        // 1 et 2 ont la même vraisemblance : le plus petit indice gagne
        assert_eq!(res.winner_index, 1);
        assert_eq!(res.winner, pool[1]);
    }

    #[test]
    fn test_ties_lowest_index() {
        let pool = vec![
            c([1, 2, 3, 4, 5, 6], 1),
            c([7, 8, 9, 10, 11, 12], 2),
            c([13, 14, 15, 16, 17, 18], 3),
        ];
        let res = nash_select(&pool, &RedProbs::uniform(), &BlueProbs::uniform(), 0.5).unwrap();
        assert_eq!(res.winner_index, 0);
    }

    #[test]
    fn test_penalty_values() {
        let red = RedProbs::uniform();
        let blue = BlueProbs::uniform();
        let pool = vec![
            c([1, 2, 3, 4, 5, 6], 1),
            c([1, 2, 20, 21, 22, 23], 1),
            c([30, 31, 32, 33, 24, 25], 9),
        ];
        let lr = -(1.0f64 / 33.0).ln();
        let lb = -(1.0f64 / 16.0).ln();
        let p0 = overlap_penalty(&pool, 0, &red, &blue);
        assert!((p0 - (2.0 * lr + 2.0 * lb)).abs() < 1e-12);
        assert_eq!(overlap_penalty(&pool, 2, &red, &blue), 0.0);
    }

    #[test]
    fn test_duplicates_penalized() {
        let red = RedProbs::uniform();
        let blue = BlueProbs::uniform();
        let dup = vec![c([1, 2, 3, 4, 5, 6], 1); 3];
        let disjoint = vec![
            c([1, 2, 3, 4, 5, 6], 1),
            c([7, 8, 9, 10, 11, 12], 2),
            c([13, 14, 15, 16, 17, 18], 3),
        ];
        let a = nash_select(&dup, &red, &blue, 0.5).unwrap();
        let b = nash_select(&disjoint, &red, &blue, 0.5).unwrap();
        assert!(a.score < b.score, "{} vs {}", a.score, b.score);
    }

    #[test]
    fn test_larger_beta_favors_low_overlap() {
        let red = RedProbs::uniform();
        let blue = BlueProbs::uniform();
        // 0 et 1 identiques, 2 disjoint, même vraisemblance
        let pool = vec![
            c([1, 2, 3, 4, 5, 6], 1),
            c([1, 2, 3, 4, 5, 6], 1),
            c([7, 8, 9, 10, 11, 12], 2),
        ];
        let mut prev_gap = f64::INFINITY;
        for beta in [0.0, 0.1, 0.5, 1.0, 3.0] {
            let res = nash_select(&pool, &red, &blue, beta).unwrap();
            let gap = res.scores[0].score - res.scores[2].score;
            assert!(gap <= prev_gap);
            prev_gap = gap;
            if beta > 0.0 {
                assert_eq!(res.winner_index, 2);
            }
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let red = RedProbs::uniform();
        let blue = BlueProbs::uniform();
        assert!(nash_select(&[], &red, &blue, 0.5).unwrap_err().is_configuration());
        let pool = vec![c([1, 2, 3, 4, 5, 6], 1)];
        assert!(nash_select(&pool, &red, &blue, -1.0).unwrap_err().is_configuration());

        let bad = vec![c([1, 2, 3, 4, 5, 6], 1), Candidate { reds: [1, 2, 3, 4, 5, 40], blue: 1 }];
        match nash_select(&bad, &red, &blue, 0.5) {
            Err(PredictError::Candidate { index, .. }) => assert_eq!(index, 1),
            other => panic!("attendu une erreur de candidat, obtenu {other:?}"),
        }
    }
}
