use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use ssq_bayes::Prediction;
use ssq_db::models::{Candidate, DrawRecord};

const HOT_COLD_THRESHOLD: f64 = 0.3;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn reds_str(reds: &[u8]) -> String {
    reds.iter()
        .map(|r| format!("{:02}", r))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Rouges", "Bleu"]);

    for draw in draws {
        let mut sorted_reds = draw.reds;
        sorted_reds.sort();

        let date = draw
            .draw_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            draw.sequence_index.to_string(),
            date,
            reds_str(&sorted_reds),
            format!("{:02}", draw.blue),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

fn display_prob_table(counts: &[f64], probs: &[f64]) {
    let mut table = new_table(vec!["Numéro", "Compte", "Probabilité", "Tag"]);
    let uniform = 1.0 / probs.len() as f64;

    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]).then(a.cmp(&b)));

    for i in order {
        let deviation = (probs[i] - uniform) / uniform;
        let (tag, color) = if deviation > HOT_COLD_THRESHOLD {
            ("HOT", Color::Green)
        } else if deviation < -HOT_COLD_THRESHOLD {
            ("COLD", Color::Red)
        } else {
            ("-", Color::White)
        };
        table.add_row(vec![
            Cell::new(format!("{:02}", i + 1)),
            Cell::new(format!("{:.2}", counts[i])),
            Cell::new(format!("{:.4}", probs[i])),
            Cell::new(tag).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_probabilities(prediction: &Prediction, model_name: &str) {
    println!("\n🎯 Probabilités a posteriori ({model_name}, {} tirages)\n", prediction.window_len);

    println!("── Rouges (1-33) ──");
    display_prob_table(prediction.red_counts.as_slice(), prediction.red_probs.as_slice());

    println!("\n── Bleus (1-16) ──");
    display_prob_table(prediction.blue_counts.as_slice(), prediction.blue_probs.as_slice());
}

pub fn display_top(top: &Candidate, next_issue: Option<i64>) {
    match next_issue {
        Some(issue) => println!("\n⭐ Grille Top (tirage {issue}) : {top}"),
        None => println!("\n⭐ Grille Top : {top}"),
    }
}

pub fn display_pool(prediction: &Prediction) {
    if prediction.pool.is_empty() {
        return;
    }
    println!("\n🎲 Grilles échantillonnées\n");

    let scores = prediction.selection.as_ref().map(|s| &s.scores);
    let mut header = vec!["#", "Rouges", "Bleu"];
    if scores.is_some() {
        header.extend(["Log-vraisemblance", "Pénalité", "Score"]);
    }
    let mut table = new_table(header);

    for (i, c) in prediction.pool.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            reds_str(&c.reds),
            format!("{:02}", c.blue),
        ];
        if let Some(scores) = scores {
            let s = &scores[i];
            row.push(format!("{:.4}", s.log_likelihood));
            row.push(format!("{:.4}", s.penalty));
            row.push(format!("{:.4}", s.score));
        }
        table.add_row(row);
    }
    println!("{table}");

    if let Some(sel) = &prediction.selection {
        println!("\n🏆 Re-sélection de Nash");
        println!(
            "Grille retenue : {} (candidat #{}, score {:.4})",
            sel.winner,
            sel.winner_index + 1,
            sel.score
        );
    }
}
