//! Requêtes à l'exécution : coordonnée → secteur → pays
//!
//! Fonctions pures en lecture seule. En cas de recouvrement (secteurs ou
//! anneaux de pays), le premier élément dans l'ordre de l'artefact l'emporte.

use crate::geometry::{GeoKernel, GeometryKernel};
use crate::types::{Coordinate, LookupArtifact, SectorEntry, SectorManifest};
use crate::Qc2cError;

/// Premier secteur dont la box contient la coordonnée (bornes incluses)
pub fn locate_sector(manifest: &SectorManifest, coordinate: Coordinate) -> Option<&str> {
    manifest
        .sector_at(coordinate)
        .map(|sector| sector.id.as_str())
}

/// Premier pays du secteur dont un anneau contient la coordonnée
pub fn locate_country(entry: &SectorEntry, coordinate: Coordinate) -> Option<&str> {
    locate_country_with(&GeoKernel, entry, coordinate)
}

/// [`locate_country`] avec un noyau géométrique explicite
pub fn locate_country_with<'e, K: GeometryKernel>(
    kernel: &K,
    entry: &'e SectorEntry,
    coordinate: Coordinate,
) -> Option<&'e str> {
    entry
        .countries
        .iter()
        .find(|country| {
            country
                .rings
                .iter()
                .any(|ring| kernel.point_in_ring(coordinate, ring))
        })
        .map(|country| country.code.as_str())
}

/// Résultat d'une localisation complète
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub sector: &'a str,
    pub country: &'a str,
}

/// Manifest + artefact chargés, prêts pour des requêtes concurrentes
#[derive(Debug, Clone)]
pub struct Locator {
    manifest: SectorManifest,
    artifact: LookupArtifact,
}

impl Locator {
    /// # Errors
    ///
    /// `UnknownSector` si l'artefact référence un secteur absent du manifest.
    pub fn new(manifest: SectorManifest, artifact: LookupArtifact) -> Result<Self, Qc2cError> {
        if let Some(entry) = artifact
            .sectors
            .iter()
            .find(|entry| manifest.get(&entry.sector_id).is_none())
        {
            return Err(Qc2cError::UnknownSector(entry.sector_id.clone()));
        }
        Ok(Self { manifest, artifact })
    }

    pub fn from_json(manifest: &str, artifact: &str) -> Result<Self, Qc2cError> {
        Self::new(
            SectorManifest::from_json_str(manifest)?,
            LookupArtifact::from_json_str(artifact)?,
        )
    }

    pub fn manifest(&self) -> &SectorManifest {
        &self.manifest
    }

    pub fn artifact(&self) -> &LookupArtifact {
        &self.artifact
    }

    /// Secteur puis pays. Un secteur du manifest absent de l'artefact donne `None`.
    pub fn locate(&self, coordinate: Coordinate) -> Option<Location<'_>> {
        let sector = locate_sector(&self.manifest, coordinate)?;
        let entry = self.artifact.sector(sector)?;
        let country = locate_country(entry, coordinate)?;
        Some(Location { sector, country })
    }
}
