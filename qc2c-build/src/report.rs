//! Rapport de build
//!
//! Collecte les statistiques par secteur et les avertissements (pays perdus
//! en route, pays hors de tout secteur) pour affichage et export JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use qc2c::{PipelineConfig, SectorStats};
use serde::Serialize;

/// Statut global du build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStatus {
    /// Build réussi sans avertissement
    Success,
    /// Artefact produit, mais des pays ont été perdus
    PartialSuccess,
    /// Aucun anneau dans l'artefact
    Failed,
}

/// Avertissement de build
#[derive(Debug, Clone, Serialize)]
pub struct BuildWarning {
    /// Code pays concerné
    pub country: String,
    /// Secteur concerné (optionnel)
    pub sector: Option<String>,
    pub message: String,
}

/// Rapport complet de build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Paramètres effectifs du pipeline
    pub config: PipelineConfig,
    /// Durée du build
    pub duration_secs: f64,
    /// Statut global
    pub status: BuildStatus,

    /// Nombre de pays lus dans le fichier source
    pub countries_loaded: usize,
    /// Nombre de pays après exclusion et simplification
    pub countries_kept: usize,
    /// Nombre de secteurs dans l'artefact
    pub sectors: usize,
    /// Nombre de secteurs sans aucun pays
    pub empty_sectors: usize,
    /// Nombre d'anneaux dans l'artefact
    pub rings: usize,
    /// Sommets avant / après traitement
    pub vertices_before: usize,
    pub vertices_after: usize,
    /// Nombre de fusions d'anneaux
    pub merges: usize,

    /// Statistiques par secteur, dans l'ordre du manifest
    pub by_sector: Vec<SectorStats>,

    /// Liste des avertissements
    pub warnings: Vec<BuildWarning>,
}

impl BuildReport {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            duration_secs: 0.0,
            status: BuildStatus::Success,
            countries_loaded: 0,
            countries_kept: 0,
            sectors: 0,
            empty_sectors: 0,
            rings: 0,
            vertices_before: 0,
            vertices_after: 0,
            merges: 0,
            by_sector: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre les statistiques de tous les secteurs
    pub fn record_sectors(&mut self, stats: Vec<SectorStats>) {
        self.sectors = stats.len();
        self.empty_sectors = stats.iter().filter(|s| s.countries == 0).count();
        self.rings = stats.iter().map(|s| s.output_rings).sum();
        self.vertices_before = stats.iter().map(|s| s.vertices_before).sum();
        self.vertices_after = stats.iter().map(|s| s.vertices_after).sum();
        self.merges = stats.iter().map(|s| s.merges).sum();
        self.by_sector = stats;
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, country: &str, sector: Option<&str>, message: &str) {
        self.warnings.push(BuildWarning {
            country: country.to_string(),
            sector: sector.map(str::to_string),
            message: message.to_string(),
        });
    }

    /// Définit la durée du build
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.rings == 0 {
            BuildStatus::Failed
        } else if !self.warnings.is_empty() {
            BuildStatus::PartialSuccess
        } else {
            BuildStatus::Success
        };
    }

    /// Part des sommets retirés, en pourcentage
    pub fn reduction_ratio(&self) -> f64 {
        if self.vertices_before == 0 {
            return 0.0;
        }
        100.0 * (1.0 - self.vertices_after as f64 / self.vertices_before as f64)
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("BUILD REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Countries: {} loaded, {} kept",
            self.countries_loaded, self.countries_kept
        );
        println!(
            "Sectors: {} ({} empty), {} rings, {} merges",
            self.sectors, self.empty_sectors, self.rings, self.merges
        );
        println!(
            "Vertices: {} -> {} ({:.1}% removed)",
            self.vertices_before,
            self.vertices_after,
            self.reduction_ratio()
        );

        let mut slowest: Vec<_> = self.by_sector.iter().filter(|s| s.countries > 0).collect();
        if !slowest.is_empty() {
            slowest.sort_by(|a, b| b.elapsed_secs.total_cmp(&a.elapsed_secs));
            println!("\n--- SLOWEST SECTORS ---");
            for s in slowest.iter().take(5) {
                println!(
                    "  {}: {:.2}s, {} countries, {} -> {} vertices, {} passes",
                    s.sector_id, s.elapsed_secs, s.countries, s.vertices_before, s.vertices_after, s.passes
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                match &w.sector {
                    Some(sector) => println!("  [{}:{}] {}", sector, w.country, w.message),
                    None => println!("  [{}] {}", w.country, w.message),
                }
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} sectors, {} rings, {} -> {} vertices, {} warnings",
            self.sectors,
            self.rings,
            self.vertices_before,
            self.vertices_after,
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(id: &str, countries: usize, rings: usize) -> SectorStats {
        SectorStats {
            sector_id: id.to_string(),
            countries,
            input_rings: rings,
            output_rings: rings,
            vertices_before: rings * 10,
            vertices_after: rings * 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_record_sectors() {
        let mut report = BuildReport::new(PipelineConfig::default());
        report.record_sectors(vec![stats("a", 2, 3), stats("b", 0, 0), stats("c", 1, 1)]);

        assert_eq!(report.sectors, 3);
        assert_eq!(report.empty_sectors, 1);
        assert_eq!(report.rings, 4);
        assert_eq!(report.vertices_before, 40);
        assert_eq!(report.vertices_after, 16);
        assert!((report.reduction_ratio() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_finalize_success() {
        let mut report = BuildReport::new(PipelineConfig::default());
        report.record_sectors(vec![stats("a", 1, 1)]);
        report.finalize();

        assert_eq!(report.status, BuildStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = BuildReport::new(PipelineConfig::default());
        report.record_sectors(vec![stats("a", 1, 1)]);
        report.record_warning("ATA", None, "Country outside every sector");
        report.finalize();

        assert_eq!(report.status, BuildStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = BuildReport::new(PipelineConfig::default());
        report.record_sectors(vec![stats("a", 0, 0)]);
        report.finalize();

        assert_eq!(report.status, BuildStatus::Failed);
    }

    #[test]
    fn test_reduction_ratio_empty() {
        let report = BuildReport::new(PipelineConfig::default());
        assert_eq!(report.reduction_ratio(), 0.0);
    }

    #[test]
    fn test_summary() {
        let mut report = BuildReport::new(PipelineConfig::default());
        report.record_sectors(vec![stats("a", 2, 3)]);

        let summary = report.summary();
        assert!(summary.contains("1 sectors"));
        assert!(summary.contains("30 -> 12 vertices"));
    }

    #[test]
    fn test_save_to_file() {
        let mut report = BuildReport::new(PipelineConfig::default());
        report.record_sectors(vec![stats("a", 1, 1)]);
        report.finalize();

        let path = std::env::temp_dir().join(format!("qc2c-report-{}.json", std::process::id()));
        report.save_to_file(&path).unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(saved["status"], "Success");
        assert_eq!(saved["by_sector"][0]["sector_id"], "a");
        assert_eq!(saved["config"]["reduce_passes"], 20);
    }
}
