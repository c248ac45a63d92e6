//! # qc2c-build
//!
//! Construction de l'artefact de recherche secteur/pays.
//!
//! ## Usage CLI
//!
//! ```bash
//! # Build complet avec le preset par défaut
//! qc2c-build build --manifest sectors.json --countries countries.json --output lookup.json
//!
//! # Build rapide avec résumé et rapport
//! qc2c-build build --manifest sectors.json --countries countries.json --output lookup.json \
//!     --config fast --summary summary.json --report report.json --jobs 8
//!
//! # Recherche d'un point
//! qc2c-build locate --manifest sectors.json --artifact lookup.json --lat 48.85 --lng 2.35
//! ```

pub mod config;
pub mod report;

pub use config::{Config, Overrides};
pub use report::{BuildReport, BuildStatus, BuildWarning};
