//! Types d'erreurs pour le crate qc2c

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement ou du traitement des polygones
#[derive(Debug, Error)]
pub enum Qc2cError {
    /// Erreur d'I/O lors de la lecture d'un fichier source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON invalide (manifest, source ou artefact)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anneau invalide (moins de 3 sommets distincts, coordonnée non finie)
    #[error("Invalid ring for {country}: {reason}")]
    InvalidRing { country: String, reason: String },

    /// Entrée de manifest invalide (mauvaise arité, min > max)
    #[error("Invalid bounding box for sector {sector}: {reason}")]
    InvalidBoundingBox { sector: String, reason: String },

    /// Secteur absent du manifest ou de l'artefact
    #[error("Unknown sector: {0}")]
    UnknownSector(String),
}

impl Qc2cError {
    /// Crée une erreur d'anneau invalide avec contexte
    pub fn invalid_ring(country: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRing {
            country: country.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de bounding box invalide
    pub fn invalid_bounding_box(sector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBoundingBox {
            sector: sector.into(),
            reason: reason.into(),
        }
    }
}
