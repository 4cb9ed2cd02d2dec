use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use ssq_db::rusqlite::Connection;
use std::path::Path;
use tracing::warn;

use ssq_db::db::insert_draw;
use ssq_db::models::DrawRecord;

const SEQUENCE_COL: &str = "期号";
const DATE_COL: &str = "开奖日期";
const BLUE_COL: &str = "蓝球";
const RED_COLS: [&str; 6] = ["红球1", "红球2", "红球3", "红球4", "红球5", "红球6"];

/// Positions des colonnes utiles dans l'en-tête du CSV.
struct Columns {
    sequence: usize,
    date: Option<usize>,
    reds: [usize; 6],
    blue: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        let require = |name: &str| {
            find(name).with_context(|| format!("Colonne '{}' absente de l'en-tête", name))
        };

        let mut reds = [0usize; 6];
        for (slot, name) in reds.iter_mut().zip(RED_COLS) {
            *slot = require(name)?;
        }

        Ok(Self {
            sequence: require(SEQUENCE_COL)?,
            date: find(DATE_COL),
            reds,
            blue: require(BLUE_COL)?,
        })
    }
}

/// "2025-10-14(二)" -> 2025-10-14 ; une date vide donne None.
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
    let cleaned = match raw.find('(') {
        Some(i) => &raw[..i],
        None => raw,
    }
    .trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(Some(date))
}

fn parse_record(record: &csv::StringRecord, cols: &Columns) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let seq_str = get(cols.sequence)?;
    let sequence_index: i64 = seq_str
        .parse()
        .with_context(|| format!("Numéro de tirage invalide: '{}'", seq_str))?;

    let draw_date = match cols.date {
        Some(idx) => parse_date(&get(idx)?)?,
        None => None,
    };

    let reds = cols
        .reds
        .iter()
        .map(|&idx| get_u8(idx))
        .collect::<Result<Vec<u8>>>()?;
    let blue = get_u8(cols.blue)?;

    let draw = DrawRecord::from_numbers(sequence_index, draw_date, &reds, blue)?;
    if let Err(defect) = draw.validate() {
        bail!("Tirage {} rejeté : {}", sequence_index, defect);
    }
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let headers = reader.headers()
        .with_context(|| format!("En-tête illisible dans {:?}", path))?
        .clone();
    let cols = Columns::from_headers(&headers)?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let line = result.total_records;
        let draw = record_result
            .map_err(anyhow::Error::from)
            .and_then(|record| parse_record(&record, &cols));
        match draw {
            Ok(draw) => match insert_draw(&tx, &draw) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    warn!(line, error = %e, "insertion impossible");
                    result.errors += 1;
                }
            },
            Err(e) => {
                warn!(line, error = %format!("{e:#}"), "ligne ignorée");
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}
