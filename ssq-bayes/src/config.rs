use serde::{Deserialize, Serialize};

use crate::error::{PredictError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Grille déterministe : les numéros les plus probables
    Top,
    /// Tirages pondérés sans remise
    #[default]
    Sample,
}

/// Préréglages (beta, fenêtre, décroissance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Balanced,
    Dedup,
    Hot,
}

impl Profile {
    pub fn beta(&self) -> f64 {
        match self {
            Profile::Balanced => 0.6,
            Profile::Dedup => 0.9,
            Profile::Hot => 0.3,
        }
    }

    pub fn recent(&self) -> usize {
        match self {
            Profile::Balanced => 120,
            Profile::Dedup => 90,
            Profile::Hot => 300,
        }
    }

    pub fn decay(&self) -> f64 {
        match self {
            Profile::Balanced => 0.98,
            Profile::Dedup => 0.97,
            Profile::Hot => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    pub method: Method,
    pub num_sets: usize,
    pub alpha_red: f64,
    pub alpha_blue: f64,
    pub seed: Option<u64>,
    pub recent: Option<usize>,
    pub decay: Option<f64>,
    pub nash_enabled: bool,
    pub beta: f64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            method: Method::Sample,
            num_sets: 6,
            alpha_red: 1.0,
            alpha_blue: 1.0,
            seed: None,
            recent: None,
            decay: None,
            nash_enabled: true,
            beta: 0.5,
        }
    }
}

impl PredictConfig {
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Un préréglage écrase beta, recent et decay.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.beta = profile.beta();
        self.recent = Some(profile.recent());
        self.decay = Some(profile.decay());
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_alpha("alpha_red", self.alpha_red)?;
        check_alpha("alpha_blue", self.alpha_blue)?;
        check_recent(self.recent)?;
        check_decay(self.decay)?;
        check_beta(self.beta)?;
        if self.method == Method::Sample && self.num_sets < 1 {
            return Err(PredictError::config(
                "num_sets doit être >= 1 en mode sample",
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_alpha(name: &str, alpha: f64) -> Result<()> {
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(PredictError::config(format!(
            "{name} doit être > 0 (reçu {alpha})"
        )));
    }
    Ok(())
}

pub(crate) fn check_decay(decay: Option<f64>) -> Result<()> {
    match decay {
        Some(g) if !(g > 0.0 && g <= 1.0) => Err(PredictError::config(format!(
            "decay doit être dans ]0, 1] (reçu {g})"
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn check_recent(recent: Option<usize>) -> Result<()> {
    match recent {
        Some(0) => Err(PredictError::config("recent doit être >= 1")),
        _ => Ok(()),
    }
}

pub(crate) fn check_beta(beta: f64) -> Result<()> {
    if !(beta.is_finite() && beta >= 0.0) {
        return Err(PredictError::config(format!(
            "beta doit être >= 0 (reçu {beta})"
        )));
    }
    Ok(())
}
