use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use ssq_db::models::{Candidate, DrawRecord};
use tracing::debug;

use crate::config::{Method, PredictConfig};
use crate::error::Result;
use crate::frequency::{count_frequencies, validate_history, BlueCounts, RedCounts};
use crate::generator::{sample_pool, top_candidate};
use crate::nash::{nash_select, SelectionResult};
use crate::posterior::{posterior_mean, BlueProbs, RedProbs};
use crate::weighting::weight_history;

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Numéro du prochain tirage (affichage seulement).
    pub next_issue: Option<i64>,
    pub window_len: usize,
    pub red_counts: RedCounts,
    pub blue_counts: BlueCounts,
    pub red_probs: RedProbs,
    pub blue_probs: BlueProbs,
    pub top: Candidate,
    pub pool: Vec<Candidate>,
    pub selection: Option<SelectionResult>,
}

pub fn predict(history: &[DrawRecord], config: &PredictConfig) -> Result<Prediction> {
    config.validate()?;
    // tout l'historique, y compris hors fenêtre
    validate_history(history)?;

    let weighted = weight_history(history, config.recent, config.decay)?;
    let (red_counts, blue_counts) = count_frequencies(&weighted)?;
    let red_probs = posterior_mean(&red_counts, config.alpha_red)?;
    let blue_probs = posterior_mean(&blue_counts, config.alpha_blue)?;

    let top = top_candidate(&red_probs, &blue_probs);

    let pool = match config.method {
        Method::Top => Vec::new(),
        Method::Sample => {
            let mut rng: StdRng = match config.seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            sample_pool(&red_probs, &blue_probs, config.num_sets, &mut rng)?
        }
    };
    debug!(window = weighted.len(), pool = pool.len(), %top, "postérieur calculé");

    let selection = if config.nash_enabled && pool.len() > 1 {
        Some(nash_select(&pool, &red_probs, &blue_probs, config.beta)?)
    } else {
        None
    };

    Ok(Prediction {
        next_issue: history.iter().map(|d| d.sequence_index).max().map(|s| s + 1),
        window_len: weighted.len(),
        red_counts,
        blue_counts,
        red_probs,
        blue_probs,
        top,
        pool,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictError;

    fn draw(seq: i64, reds: [u8; 6], blue: u8) -> DrawRecord {
        DrawRecord { sequence_index: seq, draw_date: None, reds, blue }
    }

    fn varied_history(n: i64) -> Vec<DrawRecord> {
        (0..n)
            .map(|i| {
                let b = (i * 5 % 28) as u8 + 1;
                draw(2020000 + i, [b, b + 1, b + 2, b + 3, b + 4, b + 5], (i * 3 % 16) as u8 + 1)
            })
            .collect()
    }

    #[test]
    fn test_scenario_identical_draws() {
        let history: Vec<DrawRecord> = (0..10).map(|i| draw(i, [1, 2, 3, 4, 5, 6], 1)).collect();
        let config = PredictConfig { method: Method::Top, ..Default::default() };
        let p = predict(&history, &config).unwrap();

        for n in 1..=33u8 {
            let (count, prob) = if n <= 6 { (10.0, 11.0 / 93.0) } else { (0.0, 1.0 / 93.0) };
            assert_eq!(p.red_counts.get(n), count);
            assert!((p.red_probs.get(n) - prob).abs() < 1e-12, "rouge {n}");
        }
        assert_eq!(p.blue_counts.get(1), 10.0);
        assert!((p.blue_probs.get(1) - 11.0 / 26.0).abs() < 1e-12);
        for n in 2..=16u8 {
            assert!((p.blue_probs.get(n) - 1.0 / 26.0).abs() < 1e-12);
        }
        assert_eq!(p.top, Candidate::new([1, 2, 3, 4, 5, 6], 1));
        assert!(p.pool.is_empty());
        assert!(p.selection.is_none());
        assert_eq!(p.next_issue, Some(10));
    }

    #[test]
    fn test_scenario_empty_history() {
        let p = predict(&[], &PredictConfig { seed: Some(1), ..Default::default() }).unwrap();
        assert!(p.red_probs.as_slice().iter().all(|&x| (x - 1.0 / 33.0).abs() < 1e-12));
        assert!(p.blue_probs.as_slice().iter().all(|&x| (x - 1.0 / 16.0).abs() < 1e-12));
        assert_eq!(p.top, Candidate::new([1, 2, 3, 4, 5, 6], 1));
        assert_eq!(p.next_issue, None);
        assert_eq!(p.window_len, 0);
    }

    #[test]
    fn test_sample_with_nash() {
        let history = varied_history(60);
        let config = PredictConfig { seed: Some(42), num_sets: 6, ..Default::default() };
        let p = predict(&history, &config).unwrap();

        assert_eq!(p.pool.len(), 6);
        let sel = p.selection.as_ref().unwrap();
        assert_eq!(sel.winner, p.pool[sel.winner_index]);
        assert_eq!(sel.scores.len(), 6);

        let again = predict(&history, &config).unwrap();
        assert_eq!(again.pool, p.pool);
        assert_eq!(again.selection.unwrap().winner_index, sel.winner_index);
    }

    #[test]
    fn test_nash_skipped() {
        let history = varied_history(20);
        let config = PredictConfig { seed: Some(3), num_sets: 1, ..Default::default() };
        assert!(predict(&history, &config).unwrap().selection.is_none());

        let config = PredictConfig { seed: Some(3), nash_enabled: false, ..Default::default() };
        let p = predict(&history, &config).unwrap();
        assert_eq!(p.pool.len(), 6);
        assert!(p.selection.is_none());
    }

    #[test]
    fn test_recent_and_decay() {
        let mut history = varied_history(50);
        // les 10 derniers tirages sont identiques
        for d in history.iter_mut().skip(40) {
            d.reds = [28, 29, 30, 31, 32, 33];
            d.blue = 16;
        }
        let config = PredictConfig {
            method: Method::Top,
            recent: Some(10),
            decay: Some(0.9),
            ..Default::default()
        };
        let p = predict(&history, &config).unwrap();
        assert_eq!(p.window_len, 10);
        assert_eq!(p.top, Candidate::new([28, 29, 30, 31, 32, 33], 16));
        assert!(p.red_counts.get(1) == 0.0);
    }

    #[test]
    fn test_invalid_configs() {
        let history = varied_history(5);
        let bad = [
            PredictConfig { decay: Some(0.0), ..Default::default() },
            PredictConfig { decay: Some(1.5), ..Default::default() },
            PredictConfig { alpha_red: 0.0, ..Default::default() },
            PredictConfig { method: Method::Sample, num_sets: 0, ..Default::default() },
        ];
        for config in &bad {
            let err = predict(&history, config).unwrap_err();
            assert!(err.is_configuration(), "{config:?} -> {err}");
        }
    }

    #[test]
    fn test_malformed_history_rejected() {
        let mut history = varied_history(5);
        history[2].blue = 0;
        let err = predict(&history, &PredictConfig::default()).unwrap_err();
        assert!(matches!(err, PredictError::Data { sequence_index: 2020002, .. }));
    }

    #[test]
    fn test_malformed_record_outside_window_rejected() {
        let mut history = varied_history(5);
        history[0].blue = 99;
        let config = PredictConfig { method: Method::Top, recent: Some(3), ..Default::default() };
        let err = predict(&history, &config).unwrap_err();
        assert!(matches!(err, PredictError::Data { sequence_index: 2020000, .. }), "{err}");
    }

    #[test]
    fn test_json_output() {
        let p = predict(&varied_history(8), &PredictConfig { seed: Some(5), ..Default::default() }).unwrap();
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["red_probs"].as_array().unwrap().len(), 33);
        assert_eq!(value["blue_counts"].as_array().unwrap().len(), 16);
        assert!(value["selection"]["winner_index"].is_u64());
    }
}
