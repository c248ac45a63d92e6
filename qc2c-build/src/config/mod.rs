//! Configuration du build

use std::path::Path;

use anyhow::{Context, Result};
use qc2c::PipelineConfig;
use serde::{Deserialize, Serialize};

pub const PRESETS: [&str; 3] = ["default", "fast", "thorough"];

/// Configuration principale
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Paramètres du pipeline (passes, tolérances, exclusions)
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    /// Nombre de threads rayon (défaut : nombre de cœurs)
    #[serde(default)]
    pub jobs: Option<usize>,
}

/// Surcharges venant de la ligne de commande
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub passes: Option<usize>,
    pub tolerance: Option<f64>,
    pub exclude: Vec<String>,
    pub jobs: Option<usize>,
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "fast" => Self::load_embedded(include_str!("presets/fast.json")),
            "thorough" => Self::load_embedded(include_str!("presets/thorough.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(spec: &str) -> Result<Self> {
        if PRESETS.contains(&spec) {
            Self::from_preset(spec)
        } else {
            Self::load(Path::new(spec))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Les exclusions s'ajoutent à celles de la configuration
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(passes) = overrides.passes {
            self.pipeline.reduce_passes = passes;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.pipeline.merge_tolerance = tolerance;
        }
        for code in overrides.exclude {
            if !self.pipeline.exclude.contains(&code) {
                self.pipeline.exclude.push(code);
            }
        }
        if overrides.jobs.is_some() {
            self.jobs = overrides.jobs;
        }
    }
}
