//! Pipeline complet : préparation, affectation, réduction, fusion
//!
//! Les secteurs sont indépendants et traités en parallèle (rayon). À
//! l'intérieur d'un secteur, les pays sont traités séquentiellement dans
//! l'ordre de première apparition : un pays déjà traité contraint les
//! suivants avec ses anneaux finalisés, un pays pas encore traité avec ses
//! anneaux courants. Le résultat dépend donc de cet ordre, volontairement.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::{GeoKernel, GeometryKernel};
use crate::merge::{self, PolygonMerger};
use crate::reduce::{self, VertexReducer};
use crate::sector::{assign, SectorAssignment, SectorGrid};
use crate::types::{CountryShape, LookupArtifact, Ring, SectorEntry, SectorManifest};

/// Paramètres du pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Nombre maximal de passes de réduction par secteur
    pub reduce_passes: usize,

    /// Nombre minimal de sommets conservés par anneau
    pub min_vertices: usize,

    /// Tolérance de simplification des enveloppes fusionnées (degrés)
    pub merge_tolerance: f64,

    /// Simplification topologique des anneaux source avant affectation (degrés)
    pub input_tolerance: Option<f64>,

    /// Codes pays ignorés
    pub exclude: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reduce_passes: 20,
            min_vertices: reduce::DEFAULT_MIN_VERTICES,
            merge_tolerance: merge::DEFAULT_TOLERANCE,
            input_tolerance: Some(0.1),
            exclude: Vec::new(),
        }
    }
}

/// Statistiques d'un secteur
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectorStats {
    pub sector_id: String,
    pub countries: usize,
    pub input_rings: usize,
    pub output_rings: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
    pub vertices_removed: usize,
    pub merges: usize,
    pub passes: usize,
    pub elapsed_secs: f64,
}

/// Résultat d'un build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub artifact: LookupArtifact,
    pub stats: Vec<SectorStats>,
}

pub struct Pipeline<K = GeoKernel> {
    kernel: K,
    config: PipelineConfig,
}

impl Pipeline<GeoKernel> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_kernel(GeoKernel, config)
    }
}

impl<K: GeometryKernel> Pipeline<K> {
    pub fn with_kernel(kernel: K, config: PipelineConfig) -> Self {
        Self { kernel, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Retire les pays exclus et simplifie les anneaux source.
    ///
    /// Un anneau qui dégénère à la simplification est abandonné, ainsi qu'un
    /// pays qui n'a plus aucun anneau.
    pub fn prepare(&self, countries: Vec<CountryShape>) -> Vec<CountryShape> {
        countries
            .into_iter()
            .filter(|country| {
                let excluded = self.config.exclude.iter().any(|code| *code == country.code);
                if excluded {
                    debug!(country = %country.code, "Country excluded");
                }
                !excluded
            })
            .filter_map(|country| {
                let Some(tolerance) = self.config.input_tolerance else {
                    return Some(country);
                };

                let rings: Vec<Ring> = country
                    .rings
                    .iter()
                    .filter_map(|ring| {
                        let simplified = self.kernel.simplify_preserving(ring, tolerance);
                        if simplified.is_none() {
                            warn!(country = %country.code, vertices = ring.len(), "Ring collapsed by input simplification, dropped");
                        }
                        simplified
                    })
                    .collect();

                if rings.is_empty() {
                    warn!(country = %country.code, "No ring left after input simplification, country dropped");
                    return None;
                }
                Some(CountryShape::new(country.code, rings))
            })
            .collect()
    }

    /// Construit l'artefact de lookup.
    ///
    /// Tous les secteurs du manifest sont présents dans l'artefact, dans
    /// l'ordre du manifest, y compris ceux sans pays.
    pub fn build(&self, manifest: &SectorManifest, countries: &[CountryShape]) -> BuildOutput {
        let started = Instant::now();
        let grid = SectorGrid::new(manifest);
        let assignments = assign(&grid, countries, &self.kernel);
        info!(
            sectors = assignments.len(),
            countries = countries.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Countries assigned to sectors"
        );

        let processed: Vec<(SectorEntry, SectorStats)> = assignments
            .into_par_iter()
            .map(|assignment| self.process_sector(assignment))
            .collect();

        let (sectors, stats): (Vec<SectorEntry>, Vec<SectorStats>) = processed.into_iter().unzip();

        info!(
            sectors = sectors.len(),
            rings = sectors.iter().map(SectorEntry::ring_count).sum::<usize>(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Lookup artifact built"
        );

        BuildOutput {
            artifact: LookupArtifact { sectors },
            stats,
        }
    }

    /// Réduction (plusieurs passes) puis fusion des pays d'un secteur
    pub fn process_sector(&self, assignment: SectorAssignment) -> (SectorEntry, SectorStats) {
        let started = Instant::now();
        let sector_id = assignment.sector_id.clone();
        let mut countries = assignment.group_by_country();

        let mut stats = SectorStats {
            sector_id: sector_id.clone(),
            countries: countries.len(),
            input_rings: countries.iter().map(|c| c.rings.len()).sum(),
            vertices_before: countries.iter().map(CountryShape::vertex_count).sum(),
            ..Default::default()
        };

        for _ in 0..self.config.reduce_passes {
            let (reduced, removed) = self.reduce_sector(&countries);
            countries = reduced;
            stats.passes += 1;
            stats.vertices_removed += removed;
            if removed == 0 {
                break;
            }
        }

        let (countries, merges) = self.merge_sector(&countries);
        stats.merges = merges;
        stats.output_rings = countries.iter().map(|c| c.rings.len()).sum();
        stats.vertices_after = countries.iter().map(CountryShape::vertex_count).sum();
        stats.elapsed_secs = started.elapsed().as_secs_f64();

        info!(
            sector = %sector_id,
            countries = stats.countries,
            rings = stats.output_rings,
            removed = stats.vertices_removed,
            merges = stats.merges,
            passes = stats.passes,
            elapsed_secs = stats.elapsed_secs,
            "Sector processed"
        );

        (SectorEntry { sector_id, countries }, stats)
    }

    /// Une passe de réduction sur tous les pays d'un secteur
    pub fn reduce_sector(&self, countries: &[CountryShape]) -> (Vec<CountryShape>, usize) {
        let reducer = VertexReducer::new(&self.kernel).with_min_vertices(self.config.min_vertices);
        let mut removed = 0;

        let reduced = fold_countries(countries, |country, foreign| {
            let (reduced, count) = reducer.reduce_country(country, foreign);
            debug!(country = %country.code, foreign = foreign.len(), removed = count, "Country reduced");
            removed += count;
            reduced
        });

        (reduced, removed)
    }

    /// Fusion des anneaux de chaque pays d'un secteur
    pub fn merge_sector(&self, countries: &[CountryShape]) -> (Vec<CountryShape>, usize) {
        let merger = PolygonMerger::new(&self.kernel).with_tolerance(self.config.merge_tolerance);
        let mut merges = 0;

        let merged = fold_countries(countries, |country, foreign| {
            let outcome = merger.merge(country.rings.clone(), foreign);
            debug!(
                country = %country.code,
                before = country.rings.len(),
                after = outcome.rings.len(),
                "Country merged"
            );
            merges += outcome.merges;
            CountryShape::new(country.code.clone(), outcome.rings)
        });

        (merged, merges)
    }
}

/// Pli séquentiel sur les pays d'un secteur.
///
/// Pour le pays `idx`, les anneaux étrangers sont ceux des pays déjà
/// finalisés (accumulateur) suivis de ceux des pays `idx + 1..` non traités.
fn fold_countries<F>(countries: &[CountryShape], mut step: F) -> Vec<CountryShape>
where
    F: FnMut(&CountryShape, &[&Ring]) -> CountryShape,
{
    countries
        .iter()
        .enumerate()
        .fold(Vec::with_capacity(countries.len()), |mut done, (idx, country)| {
            let foreign: Vec<&Ring> = done
                .iter()
                .chain(&countries[idx + 1..])
                .flat_map(|c| c.rings.iter())
                .collect();
            let finalized = step(country, &foreign);
            done.push(finalized);
            done
        })
}
