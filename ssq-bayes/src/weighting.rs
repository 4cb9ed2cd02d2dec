use ssq_db::models::DrawRecord;
use tracing::debug;

use crate::config::{check_decay, check_recent};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedDraw<'a> {
    pub draw: &'a DrawRecord,
    pub weight: f64,
}

/// Fenêtre pondérée, du plus ancien au plus récent.
pub type WeightedHistory<'a> = Vec<WeightedDraw<'a>>;

/// `decay^age`, sans troncature de l'exposant.
pub fn recency_weight(decay: f64, age: usize) -> f64 {
    match i32::try_from(age) {
        Ok(e) => decay.powi(e),
        Err(_) => decay.powf(age as f64),
    }
}

/// Trie l'historique (numéro de tirage puis date), garde les `recent` derniers
/// et attribue le poids `decay^(n-1-position)`, soit 1 pour le plus récent.
pub fn weight_history(
    history: &[DrawRecord],
    recent: Option<usize>,
    decay: Option<f64>,
) -> Result<WeightedHistory<'_>> {
    check_recent(recent)?;
    check_decay(decay)?;

    let mut sorted: Vec<&DrawRecord> = history.iter().collect();
    sorted.sort_by(|a, b| {
        a.sequence_index
            .cmp(&b.sequence_index)
            .then(a.draw_date.cmp(&b.draw_date))
    });

    let start = match recent {
        Some(r) => sorted.len().saturating_sub(r),
        None => 0,
    };
    let window = &sorted[start..];
    let n = window.len();

    let weighted: WeightedHistory<'_> = window
        .iter()
        .enumerate()
        .map(|(position, &draw)| {
            let weight = match decay {
                Some(g) => recency_weight(g, n - 1 - position),
                None => 1.0,
            };
            WeightedDraw { draw, weight }
        })
        .collect();

    debug!(total = history.len(), window = n, ?decay, "fenêtre pondérée");
    Ok(weighted)
}
