//! Définition et implémentation des commandes CLI
//!
//! - `build`: pays source + manifest → artefact de recherche
//! - `locate`: coordonnée → secteur et pays

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use qc2c::{locate_sector, source, summarize, Coordinate, CountryShape, Locator, LookupArtifact, Pipeline};
use serde::Serialize;
use tracing::{info, warn};

use qc2c_build::{BuildReport, Config, Overrides};

#[derive(Subcommand)]
pub enum Commands {
    /// Build the lookup artifact from country boundaries
    Build(BuildArgs),

    /// Find the sector and country containing a coordinate
    Locate {
        /// Sector manifest (JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Lookup artifact produced by `build`
        #[arg(short, long)]
        artifact: PathBuf,

        /// Latitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

#[derive(Args)]
pub struct BuildArgs {
    /// Sector manifest: { id: [min_lat, min_lng, max_lat, max_lng] }
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Country boundaries: { code: [[[lng, lat], ...], ...] }
    #[arg(short, long)]
    pub countries: PathBuf,

    /// Output lookup artifact (compact JSON)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write per-sector bounds and country centers to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Write the build report (JSON) to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Config preset name (default/fast/thorough) or path to a JSON config
    #[arg(long, default_value = "default")]
    pub config: String,

    /// Maximum reduction passes per sector
    #[arg(long)]
    pub passes: Option<usize>,

    /// Simplification tolerance of merged hulls (degrees)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Country code to skip (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Number of worker threads
    #[arg(long, alias = "threads")]
    pub jobs: Option<usize>,
}

/// Exécute la commande build
pub fn cmd_build(args: BuildArgs) -> Result<()> {
    let started = Instant::now();

    let mut config = Config::resolve(&args.config)?;
    config.apply(Overrides {
        passes: args.passes,
        tolerance: args.tolerance,
        exclude: args.exclude,
        jobs: args.jobs,
    });

    if let Some(jobs) = config.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    println!("=== Build ===");
    println!("Manifest: {}", args.manifest.display());
    println!("Countries: {}", args.countries.display());
    println!("Output: {}", args.output.display());
    println!("Config: {}", args.config);
    println!("Jobs: {}", rayon::current_num_threads());
    println!("Reduce passes: {}", config.pipeline.reduce_passes);
    println!("Merge tolerance: {}", config.pipeline.merge_tolerance);
    println!("Excluded: {}", config.pipeline.exclude.join(", "));

    let manifest = source::load_manifest(&args.manifest)
        .with_context(|| format!("Failed to load sector manifest: {}", args.manifest.display()))?;
    let countries = source::load_countries(&args.countries)
        .with_context(|| format!("Failed to load countries: {}", args.countries.display()))?;

    let mut report = BuildReport::new(config.pipeline.clone());
    report.countries_loaded = countries.len();

    let pipeline = Pipeline::new(config.pipeline);
    let loaded_codes: Vec<String> = countries.iter().map(|c| c.code.clone()).collect();
    let countries = pipeline.prepare(countries);
    report.countries_kept = countries.len();

    for code in &loaded_codes {
        let excluded = pipeline.config().exclude.contains(code);
        if !excluded && !countries.iter().any(|c| &c.code == code) {
            report.record_warning(code, None, "Country dropped by input simplification");
        }
    }

    let output = pipeline.build(&manifest, &countries);
    record_orphans(&mut report, &countries, &output.artifact);
    report.record_sectors(output.stats);

    write_json(&args.output, &output.artifact, false)?;
    info!(path = %args.output.display(), "Lookup artifact written");

    if let Some(path) = &args.summary {
        write_json(path, &summarize(&manifest, &output.artifact), true)?;
        info!(path = %path.display(), "Summary written");
    }

    report.set_duration(started.elapsed());
    report.finalize();
    report.display();

    if let Some(path) = &args.report {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }

    println!("{}", report.summary());
    Ok(())
}

/// Exécute la commande locate
pub fn cmd_locate(manifest: &Path, artifact: &Path, lat: f64, lng: f64) -> Result<()> {
    let manifest = source::load_manifest(manifest)
        .with_context(|| format!("Failed to load sector manifest: {}", manifest.display()))?;
    let artifact = source::load_artifact(artifact)
        .with_context(|| format!("Failed to load lookup artifact: {}", artifact.display()))?;
    let locator = Locator::new(manifest, artifact).context("Artifact does not match manifest")?;

    let coordinate = Coordinate::new(lat, lng);
    match locator.locate(coordinate) {
        Some(found) => println!("{} {}", found.sector, found.country),
        None => match locate_sector(locator.manifest(), coordinate) {
            Some(sector) => println!("No country found at ({lat}, {lng}) in sector {sector}"),
            None => println!("No sector contains ({lat}, {lng})"),
        },
    }

    Ok(())
}

/// Pays conservés qui n'apparaissent dans aucun secteur
fn record_orphans(report: &mut BuildReport, countries: &[CountryShape], artifact: &LookupArtifact) {
    let placed: HashSet<&str> = artifact
        .sectors
        .iter()
        .flat_map(|entry| entry.countries.iter().map(|c| c.code.as_str()))
        .collect();

    for country in countries {
        if !placed.contains(country.code.as_str()) {
            warn!(country = %country.code, "Country outside every sector");
            report.record_warning(&country.code, None, "Country outside every sector");
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    }
    .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
