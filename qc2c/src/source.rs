//! Chargement des fichiers d'entrée (pays source, manifest, artefact)
//!
//! Les pays source sont des anneaux `[lng, lat]` (ordre GeoJSON), inversés
//! en `[lat, lng]` à la lecture. Un code répété ajoute ses anneaux au pays
//! déjà rencontré.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::types::{CountryShape, LookupArtifact, OrderedMap, SectorManifest};
use crate::Qc2cError;

/// Décode un objet `{ code: [[[lng, lat], ...], ...] }`
///
/// # Errors
///
/// `Json` si le document est mal formé, `InvalidRing` pour un anneau de
/// moins de 3 sommets distincts ou une coordonnée non finie.
pub fn parse_countries(json: &str) -> Result<Vec<CountryShape>, Qc2cError> {
    let raw: OrderedMap<Vec<Vec<[f64; 2]>>> = serde_json::from_str(json)?;
    let mut countries: Vec<CountryShape> = Vec::with_capacity(raw.0.len());

    for (code, rings) in raw.0 {
        let shape = CountryShape::from_lng_lat(&code, &rings)?;
        match countries.iter_mut().find(|c| c.code == code) {
            Some(existing) => {
                debug!(country = %code, rings = shape.rings.len(), "Duplicate country code, rings appended");
                existing.rings.extend(shape.rings);
            }
            None => countries.push(shape),
        }
    }

    Ok(countries)
}

pub fn load_countries(path: &Path) -> Result<Vec<CountryShape>, Qc2cError> {
    let countries = parse_countries(&fs::read_to_string(path)?)?;
    info!(
        path = %path.display(),
        countries = countries.len(),
        rings = countries.iter().map(|c| c.rings.len()).sum::<usize>(),
        "Countries loaded"
    );
    Ok(countries)
}

pub fn load_manifest(path: &Path) -> Result<SectorManifest, Qc2cError> {
    let manifest = SectorManifest::from_json_str(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), sectors = manifest.len(), "Sector manifest loaded");
    Ok(manifest)
}

pub fn load_artifact(path: &Path) -> Result<LookupArtifact, Qc2cError> {
    let artifact = LookupArtifact::from_json_str(&fs::read_to_string(path)?)?;
    debug!(path = %path.display(), sectors = artifact.sectors.len(), "Lookup artifact loaded");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    #[test]
    fn test_parse_countries_keeps_order_and_swaps_axes() {
        let countries = parse_countries(
            r#"{
                "ZZZ": [[[10, 1], [20, 1], [20, 2], [10, 2], [10, 1]]],
                "AAA": [[[0, 0], [1, 0], [1, 1]]]
            }"#,
        )
        .unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].code, "ZZZ");
        assert_eq!(countries[1].code, "AAA");
        assert_eq!(countries[0].rings[0].len(), 4);
        assert_eq!(countries[0].rings[0].vertices()[1], Coord { x: 1.0, y: 20.0 });
    }

    #[test]
    fn test_parse_countries_merges_duplicate_codes() {
        let countries = parse_countries(
            r#"{
                "FRA": [[[0, 0], [1, 0], [1, 1]]],
                "ESP": [[[5, 5], [6, 5], [6, 6]]],
                "FRA": [[[9, 9], [9, 8], [8, 8]]]
            }"#,
        )
        .unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].code, "FRA");
        assert_eq!(countries[0].rings.len(), 2);
    }

    #[test]
    fn test_parse_countries_rejects_two_vertex_ring() {
        let err = parse_countries(r#"{"BAD": [[[0, 0], [1, 1]]]}"#).unwrap_err();
        assert!(matches!(err, Qc2cError::InvalidRing { ref country, .. } if country == "BAD"));
    }

    #[test]
    fn test_parse_countries_rejects_non_object() {
        let err = parse_countries("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, Qc2cError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_manifest(Path::new("/nonexistent/sectors.json")).unwrap_err();
        assert!(matches!(err, Qc2cError::Io(_)));
    }
}
