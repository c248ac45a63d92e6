//! Résumé par secteur : bornes et centroïde de chaque pays

use geo::{Centroid, MultiPolygon};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::types::{BoundingBox, Coordinate, CountryShape, LookupArtifact, SectorManifest};

/// Bornes d'un secteur et centre `[lat, lng]` de chaque pays qu'il contient
#[derive(Debug, Clone, PartialEq)]
pub struct SectorSummary {
    pub sector_id: String,
    pub bounds: BoundingBox,
    pub centers: Vec<(String, Coordinate)>,
}

impl Serialize for SectorSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Centers<'a>(&'a [(String, Coordinate)]);

        impl Serialize for Centers<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (code, center) in self.0 {
                    map.serialize_entry(code, &[center.lat, center.lng])?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("SectorSummary", 2)?;
        state.serialize_field("bounds", &self.bounds)?;
        state.serialize_field("center", &Centers(&self.centers))?;
        state.end()
    }
}

/// Ensemble des résumés, sérialisé comme `{ sector_id: { bounds, center } }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactSummary {
    pub sectors: Vec<SectorSummary>,
}

impl Serialize for ArtifactSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sectors.len()))?;
        for summary in &self.sectors {
            map.serialize_entry(&summary.sector_id, summary)?;
        }
        map.end()
    }
}

/// Centroïde de l'ensemble des anneaux d'un pays
pub fn country_center(country: &CountryShape) -> Option<Coordinate> {
    let polygons = MultiPolygon::new(country.rings.iter().map(|r| r.polygon().clone()).collect());
    polygons
        .centroid()
        .map(|p| Coordinate::new(p.x(), p.y()))
        .filter(|c| c.lat.is_finite() && c.lng.is_finite())
}

/// Résumé de tous les secteurs du manifest, dans l'ordre du manifest
pub fn summarize(manifest: &SectorManifest, artifact: &LookupArtifact) -> ArtifactSummary {
    let sectors = manifest
        .iter()
        .map(|sector| {
            let centers = artifact
                .sector(&sector.id)
                .map(|entry| {
                    entry
                        .countries
                        .iter()
                        .filter_map(|country| {
                            country_center(country).map(|center| (country.code.clone(), center))
                        })
                        .collect()
                })
                .unwrap_or_default();

            SectorSummary {
                sector_id: sector.id.clone(),
                bounds: sector.bounds,
                centers,
            }
        })
        .collect();

    ArtifactSummary { sectors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let manifest =
            SectorManifest::from_json_str(r#"{"s1": [0, 0, 10, 10], "s2": [20, 20, 30, 30]}"#).unwrap();
        let artifact = LookupArtifact::from_json_str(
            r#"{"s1": {"AAA": [[[0, 0], [0, 2], [2, 2], [2, 0]]], "BBB": [[[4, 4], [4, 6], [6, 6], [6, 4]], [[8, 4], [8, 6], [10, 6], [10, 4]]]}}"#,
        )
        .unwrap();

        let summary = summarize(&manifest, &artifact);
        assert_eq!(summary.sectors.len(), 2);

        let s1 = &summary.sectors[0];
        assert_eq!(s1.centers[0], ("AAA".to_string(), Coordinate::new(1.0, 1.0)));
        assert_eq!(s1.centers[1], ("BBB".to_string(), Coordinate::new(7.0, 5.0)));
        assert!(summary.sectors[1].centers.is_empty());

        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            r#"{"s1":{"bounds":[0.0,0.0,10.0,10.0],"center":{"AAA":[1.0,1.0],"BBB":[7.0,5.0]}},"s2":{"bounds":[20.0,20.0,30.0,30.0],"center":{}}}"#
        );
    }
}
