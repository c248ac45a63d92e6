//! # qc2c
//!
//! Index spatial secteur/pays : prétraitement des frontières de pays et
//! recherche rapide du pays contenant une coordonnée.
//!
//! ## Features
//!
//! - Découpage du monde en secteurs rectangulaires nommés
//! - Réduction des sommets contrainte par les pays voisins
//! - Fusion des parties d'un même pays en enveloppes convexes
//! - Recherche point → secteur → pays (ray casting)
//! - Secteurs traités en parallèle avec `rayon`
//!
//! ## Conventions
//!
//! Les coordonnées internes sont `[lat, lng]` (`Coord.x` = latitude). Les
//! pays source sont lus en `[lng, lat]` et inversés au chargement.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qc2c::{source, Coordinate, Locator, Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let manifest = source::load_manifest(Path::new("sectors.json"))?;
//! let countries = source::load_countries(Path::new("countries.json"))?;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let output = pipeline.build(&manifest, &pipeline.prepare(countries));
//!
//! let locator = Locator::new(manifest, output.artifact)?;
//! if let Some(found) = locator.locate(Coordinate::new(48.85, 2.35)) {
//!     println!("{} {}", found.sector, found.country);
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod locate;
pub mod merge;
pub mod pipeline;
pub mod reduce;
pub mod sector;
pub mod source;
pub mod summary;
pub mod types;

pub use error::Qc2cError;
pub use geometry::{GeoKernel, GeometryKernel};
pub use locate::{locate_country, locate_country_with, locate_sector, Location, Locator};
pub use merge::PolygonMerger;
pub use pipeline::{BuildOutput, Pipeline, PipelineConfig, SectorStats};
pub use reduce::VertexReducer;
pub use sector::{assign, SectorAssignment, SectorGrid};
pub use summary::{summarize, ArtifactSummary, SectorSummary};
pub use types::{
    BoundingBox, Coordinate, CountryShape, LookupArtifact, Ring, Sector, SectorEntry,
    SectorManifest,
};
