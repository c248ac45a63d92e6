//! Types de données pour le crate qc2c
//!
//! Convention d'axes : à l'intérieur de la librairie, une `Coord` geo porte la
//! latitude en `x` et la longitude en `y`. Les sources (x=lng, y=lat) sont
//! retournées à l'entrée via [`Ring::from_lng_lat`].

use std::fmt;
use std::marker::PhantomData;

use geo::{Coord, LineString, Polygon};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Qc2cError;

/// Coordonnée géographique (latitude, longitude) en degrés
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.lat, y: c.lng }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.x, lng: c.y }
    }
}

/// Rectangle englobant `[min_x, min_y, max_x, max_y]`
///
/// Dans l'espace de l'artefact, `x` est la latitude et `y` la longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Construit une bounding box depuis une entrée de manifest (4 valeurs)
    pub fn from_slice(sector: &str, values: &[f64]) -> Result<Self, Qc2cError> {
        let [min_x, min_y, max_x, max_y] = values else {
            return Err(Qc2cError::invalid_bounding_box(
                sector,
                format!("expected 4 values, got {}", values.len()),
            ));
        };

        if values.iter().any(|v| !v.is_finite()) {
            return Err(Qc2cError::invalid_bounding_box(
                sector,
                "non-finite coordinate",
            ));
        }
        if min_x > max_x || min_y > max_y {
            return Err(Qc2cError::invalid_bounding_box(
                sector,
                format!("min > max in [{min_x}, {min_y}, {max_x}, {max_y}]"),
            ));
        }

        Ok(Self {
            min_x: *min_x,
            min_y: *min_y,
            max_x: *max_x,
            max_y: *max_y,
        })
    }

    /// Test d'appartenance inclusif (bords compris)
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.min_x <= coordinate.lat
            && coordinate.lat <= self.max_x
            && self.min_y <= coordinate.lng
            && coordinate.lng <= self.max_y
    }

    /// Anneau rectangulaire correspondant à la box
    ///
    /// Une box dégénérée (largeur ou hauteur nulle) reste utilisable pour les
    /// tests d'intersection, d'où l'absence de validation ici.
    pub fn to_ring(&self) -> Ring {
        let coords = vec![
            Coord { x: self.min_x, y: self.min_y },
            Coord { x: self.min_x, y: self.max_y },
            Coord { x: self.max_x, y: self.max_y },
            Coord { x: self.max_x, y: self.min_y },
        ];
        Ring {
            polygon: Polygon::new(LineString::new(coords), vec![]),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

/// Anneau simple fermé (frontière extérieure d'un polygone, sans trou)
///
/// Stocké comme `Polygon` geo pour éviter les conversions répétées dans les
/// prédicats. Le sommet de fermeture est implicite : [`Ring::vertices`] ne le
/// contient pas.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    polygon: Polygon<f64>,
}

impl Ring {
    /// Construit un anneau en supprimant les doublons consécutifs et le point
    /// de fermeture. Retourne `None` s'il reste moins de 3 sommets distincts.
    pub fn new(vertices: impl IntoIterator<Item = Coord<f64>>) -> Option<Self> {
        let mut coords: Vec<Coord<f64>> = vertices.into_iter().collect();
        coords.dedup();
        while coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }

        if coords.len() < 3 || distinct_count(&coords) < 3 {
            return None;
        }

        Some(Self {
            polygon: Polygon::new(LineString::new(coords), vec![]),
        })
    }

    /// Anneau depuis des paires `[lat, lng]` (format de l'artefact)
    pub fn from_lat_lng(country: &str, points: &[[f64; 2]]) -> Result<Self, Qc2cError> {
        Self::validated(country, points.iter().map(|&[x, y]| Coord { x, y }))
    }

    /// Anneau depuis des paires source `[lng, lat]`, avec inversion des axes
    pub fn from_lng_lat(country: &str, points: &[[f64; 2]]) -> Result<Self, Qc2cError> {
        Self::validated(
            country,
            points.iter().map(|&[lng, lat]| Coord { x: lat, y: lng }),
        )
    }

    fn validated(
        country: &str,
        coords: impl Iterator<Item = Coord<f64>>,
    ) -> Result<Self, Qc2cError> {
        let coords: Vec<Coord<f64>> = coords.collect();

        if coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(Qc2cError::invalid_ring(country, "non-finite coordinate"));
        }

        let count = coords.len();
        Self::new(coords).ok_or_else(|| {
            Qc2cError::invalid_ring(
                country,
                format!("fewer than 3 distinct vertices ({count} points)"),
            )
        })
    }

    /// Reconstruit un anneau depuis l'extérieur d'un polygone geo
    pub fn from_polygon(polygon: &Polygon<f64>) -> Option<Self> {
        Self::new(polygon.exterior().0.iter().copied())
    }

    /// Sommets distincts, sans le point de fermeture
    pub fn vertices(&self) -> &[Coord<f64>] {
        let coords = &self.polygon.exterior().0;
        &coords[..coords.len().saturating_sub(1)]
    }

    pub fn len(&self) -> usize {
        self.vertices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices().is_empty()
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Copie de l'anneau privée du sommet `index`
    pub fn without_vertex(&self, index: usize) -> Option<Self> {
        let vertices = self.vertices();
        if index >= vertices.len() {
            return None;
        }
        Self::new(
            vertices
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != index)
                .map(|(_, c)| *c),
        )
    }

    /// Paires `[lat, lng]`, anneau fermé
    pub fn to_lat_lng(&self) -> Vec<[f64; 2]> {
        self.polygon.exterior().0.iter().map(|c| [c.x, c.y]).collect()
    }
}

impl Serialize for Ring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let coords = &self.polygon.exterior().0;
        let mut seq = serializer.serialize_seq(Some(coords.len()))?;
        for c in coords {
            seq.serialize_element(&[c.x, c.y])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Ring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ring::from_lat_lng("artifact", &points).map_err(de::Error::custom)
    }
}

/// Pays et ses anneaux (plusieurs parties possibles, ex: îles)
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub code: String,
    pub rings: Vec<Ring>,
}

impl CountryShape {
    pub fn new(code: impl Into<String>, rings: Vec<Ring>) -> Self {
        Self {
            code: code.into(),
            rings,
        }
    }

    /// Construit un pays depuis des anneaux source `[lng, lat]`
    pub fn from_lng_lat(code: &str, rings: &[Vec<[f64; 2]>]) -> Result<Self, Qc2cError> {
        let rings = rings
            .iter()
            .map(|ring| Ring::from_lng_lat(code, ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(code, rings))
    }

    /// Nombre total de sommets sur tous les anneaux
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Ring::len).sum()
    }
}

/// Secteur nommé du découpage du monde
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub id: String,
    pub bounds: BoundingBox,
}

/// Manifest des secteurs, dans l'ordre du fichier source
///
/// L'ordre est significatif : en cas de recouvrement de secteurs, le premier
/// qui contient le point l'emporte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorManifest {
    sectors: Vec<Sector>,
}

impl SectorManifest {
    pub fn new(sectors: Vec<Sector>) -> Self {
        Self { sectors }
    }

    /// Charge un manifest `{ id: [min_x, min_y, max_x, max_y] }`
    ///
    /// # Errors
    ///
    /// `InvalidBoundingBox` si une entrée n'a pas 4 valeurs ou si min > max.
    pub fn from_json_str(json: &str) -> Result<Self, Qc2cError> {
        let raw: OrderedMap<Vec<f64>> = serde_json::from_str(json)?;
        let sectors = raw
            .0
            .into_iter()
            .map(|(id, values)| {
                let bounds = BoundingBox::from_slice(&id, &values)?;
                Ok(Sector { id, bounds })
            })
            .collect::<Result<Vec<_>, Qc2cError>>()?;
        Ok(Self { sectors })
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    /// Premier secteur (ordre du manifest) dont la box contient le point
    pub fn sector_at(&self, coordinate: Coordinate) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.bounds.contains(coordinate))
    }

    pub fn get(&self, id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl Serialize for SectorManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sectors.len()))?;
        for sector in &self.sectors {
            map.serialize_entry(&sector.id, &sector.bounds)?;
        }
        map.end()
    }
}

/// Contenu d'un secteur dans l'artefact : pays → anneaux
///
/// Sérialisé comme un objet `{ code: [ring, ...] }` ; l'identifiant du
/// secteur est porté par la clé englobante.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorEntry {
    pub sector_id: String,
    pub countries: Vec<CountryShape>,
}

impl SectorEntry {
    pub fn country(&self, code: &str) -> Option<&CountryShape> {
        self.countries.iter().find(|c| c.code == code)
    }

    pub fn ring_count(&self) -> usize {
        self.countries.iter().map(|c| c.rings.len()).sum()
    }
}

impl Serialize for SectorEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.countries.len()))?;
        for country in &self.countries {
            map.serialize_entry(&country.code, &country.rings)?;
        }
        map.end()
    }
}

/// Artefact de lookup : secteur → pays → anneaux
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupArtifact {
    pub sectors: Vec<SectorEntry>,
}

impl LookupArtifact {
    pub fn from_json_str(json: &str) -> Result<Self, Qc2cError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sector(&self, id: &str) -> Option<&SectorEntry> {
        self.sectors.iter().find(|s| s.sector_id == id)
    }
}

impl Serialize for LookupArtifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sectors.len()))?;
        for entry in &self.sectors {
            map.serialize_entry(&entry.sector_id, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LookupArtifact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = OrderedMap::<OrderedMap<Vec<Ring>>>::deserialize(deserializer)?;
        let sectors = raw
            .0
            .into_iter()
            .map(|(sector_id, countries)| SectorEntry {
                sector_id,
                countries: countries
                    .0
                    .into_iter()
                    .map(|(code, rings)| CountryShape { code, rings })
                    .collect(),
            })
            .collect();
        Ok(Self { sectors })
    }
}

/// Nombre de coordonnées distinctes, quel que soit leur rang dans l'anneau
fn distinct_count(coords: &[Coord<f64>]) -> usize {
    let mut keys: Vec<(u64, u64)> = coords.iter().map(|c| (c.x.to_bits(), c.y.to_bits())).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

/// Objet JSON décodé en conservant l'ordre des clés (et les doublons)
#[derive(Debug)]
pub(crate) struct OrderedMap<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
