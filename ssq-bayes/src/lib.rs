//! Estimation bayésienne des fréquences du Double Color Ball (33 rouges, 16 bleus)
//! et re-sélection d'une grille parmi des candidats tirés au sort.
//!
//! Toutes les étapes sont pures : l'historique est un instantané immuable et la
//! source aléatoire est passée explicitement.

pub mod config;
pub mod error;
pub mod frequency;
pub mod generator;
pub mod nash;
pub mod pipeline;
pub mod posterior;
pub mod weighting;

pub use config::{Method, PredictConfig, Profile};
pub use error::{PredictError, Result};
pub use pipeline::{predict, Prediction};
