use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const RED_POOL_SIZE: usize = 33;
pub const BLUE_POOL_SIZE: usize = 16;
pub const RED_PICK: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub sequence_index: i64,
    pub draw_date: Option<NaiveDate>,
    pub reds: [u8; RED_PICK],
    pub blue: u8,
}

impl DrawRecord {
    /// Construit un tirage depuis une liste de rouges de longueur quelconque.
    /// Seule l'arité est contrôlée ici ; les plages et doublons relèvent de `validate`.
    pub fn from_numbers(
        sequence_index: i64,
        draw_date: Option<NaiveDate>,
        reds: &[u8],
        blue: u8,
    ) -> Result<Self, RecordDefect> {
        let reds: [u8; RED_PICK] = reds
            .try_into()
            .map_err(|_| RecordDefect::RedArity { found: reds.len() })?;
        Ok(Self {
            sequence_index,
            draw_date,
            reds,
            blue,
        })
    }

    pub fn validate(&self) -> Result<(), RecordDefect> {
        validate_numbers(&self.reds, self.blue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Red,
    Blue,
}

impl Pool {
    pub fn size(&self) -> usize {
        match self {
            Pool::Red => RED_POOL_SIZE,
            Pool::Blue => BLUE_POOL_SIZE,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Pool::Red => RED_PICK,
            Pool::Blue => 1,
        }
    }

    pub fn numbers_from<'a>(&self, draw: &'a DrawRecord) -> &'a [u8] {
        match self {
            Pool::Red => &draw.reds,
            Pool::Blue => std::slice::from_ref(&draw.blue),
        }
    }
}

/// Une grille jouable : 6 rouges triés + 1 bleu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub reds: [u8; RED_PICK],
    pub blue: u8,
}

impl Candidate {
    pub fn new(mut reds: [u8; RED_PICK], blue: u8) -> Self {
        reds.sort_unstable();
        Self { reds, blue }
    }

    pub fn validate(&self) -> Result<(), RecordDefect> {
        validate_numbers(&self.reds, self.blue)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reds = self
            .reds
            .iter()
            .map(|r| format!("{:02}", r))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{} | {:02}", reds, self.blue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordDefect {
    #[error("{found} boules rouges au lieu de 6")]
    RedArity { found: usize },
    #[error("boule rouge {0} hors limites (1-33)")]
    RedOutOfRange(u8),
    #[error("boule rouge en double : {0}")]
    DuplicateRed(u8),
    #[error("boule bleue {0} hors limites (1-16)")]
    BlueOutOfRange(u8),
}

pub fn validate_numbers(reds: &[u8; RED_PICK], blue: u8) -> Result<(), RecordDefect> {
    for &r in reds {
        if r < 1 || r as usize > RED_POOL_SIZE {
            return Err(RecordDefect::RedOutOfRange(r));
        }
    }
    for i in 0..reds.len() {
        for j in (i + 1)..reds.len() {
            if reds[i] == reds[j] {
                return Err(RecordDefect::DuplicateRed(reds[i]));
            }
        }
    }
    if blue < 1 || blue as usize > BLUE_POOL_SIZE {
        return Err(RecordDefect::BlueOutOfRange(blue));
    }
    Ok(())
}
