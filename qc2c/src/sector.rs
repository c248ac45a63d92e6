//! Découpage en secteurs et affectation des anneaux
//!
//! Un anneau est copié tel quel dans chaque secteur qu'il intersecte : pas de
//! découpage à la frontière, les polygones à cheval sont dupliqués.

use tracing::{debug, warn};

use crate::geometry::GeometryKernel;
use crate::types::{CountryShape, Ring, Sector, SectorManifest};

/// Grille de secteurs avec l'anneau rectangulaire de chaque secteur
pub struct SectorGrid<'m> {
    sectors: Vec<(&'m Sector, Ring)>,
}

impl<'m> SectorGrid<'m> {
    pub fn new(manifest: &'m SectorManifest) -> Self {
        let sectors = manifest
            .iter()
            .map(|sector| (sector, sector.bounds.to_ring()))
            .collect();
        Self { sectors }
    }

    /// Secteurs dont la box intersecte l'anneau, avec leur rang dans le manifest
    pub fn sectors_for<'a, K: GeometryKernel>(
        &'a self,
        kernel: &'a K,
        ring: &'a Ring,
    ) -> impl Iterator<Item = (usize, &'m Sector)> + 'a {
        self.sectors
            .iter()
            .enumerate()
            .filter(move |(_, (_, box_ring))| kernel.rings_intersect(ring, box_ring))
            .map(|(idx, (sector, _))| (idx, *sector))
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

/// Anneaux affectés à un secteur, dans l'ordre d'entrée
#[derive(Debug, Clone)]
pub struct SectorAssignment {
    pub sector_id: String,
    pub rings: Vec<(String, Ring)>,
}

impl SectorAssignment {
    /// Regroupe les anneaux par pays, dans l'ordre de première apparition
    pub fn group_by_country(self) -> Vec<CountryShape> {
        let mut countries: Vec<CountryShape> = Vec::new();
        for (code, ring) in self.rings {
            match countries.iter_mut().find(|c| c.code == code) {
                Some(country) => country.rings.push(ring),
                None => countries.push(CountryShape::new(code, vec![ring])),
            }
        }
        countries
    }
}

/// Affecte chaque anneau de chaque pays à tous les secteurs qu'il intersecte.
///
/// Le résultat suit l'ordre du manifest ; un secteur sans anneau est présent
/// avec une liste vide.
pub fn assign<K: GeometryKernel>(
    grid: &SectorGrid<'_>,
    countries: &[CountryShape],
    kernel: &K,
) -> Vec<SectorAssignment> {
    let mut assignments: Vec<SectorAssignment> = grid
        .sectors
        .iter()
        .map(|(sector, _)| SectorAssignment {
            sector_id: sector.id.clone(),
            rings: Vec::new(),
        })
        .collect();

    let mut orphans = 0usize;

    for country in countries {
        for ring in &country.rings {
            let mut hits = 0usize;
            for (idx, _) in grid.sectors_for(kernel, ring) {
                assignments[idx]
                    .rings
                    .push((country.code.clone(), ring.clone()));
                hits += 1;
            }

            match hits {
                0 => {
                    orphans += 1;
                    warn!(country = %country.code, vertices = ring.len(), "Ring outside every sector, dropped");
                }
                1 => {}
                n => debug!(country = %country.code, sectors = n, "Ring straddles sectors, duplicated"),
            }
        }
    }

    debug!(
        sectors = assignments.len(),
        rings = assignments.iter().map(|a| a.rings.len()).sum::<usize>(),
        orphans,
        "Sector assignment done"
    );

    assignments
}
