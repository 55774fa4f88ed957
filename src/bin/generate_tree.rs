//! Single tree generation utility
//!
//! Generates one tree for an orbit camera and prints a summary of the
//! produced records, optionally writing them as JSON.
//!
//! Usage:
//!     generate_tree [OPTIONS]
//!
//! Options:
//!     -t, --type <TYPE>       Species: apple, sassafras, palm, tamarack, default
//!     --seed <SEED>           Tree seed
//!     --season <SEASON>       Season in [0, 4]
//!     --wind <STRENGTH>       Wind strength
//!     --yaw <DEGREES>         Camera yaw around the tree
//!     --pitch <DEGREES>       Camera pitch above the horizon
//!     --distance <METERS>     Camera distance from the tree
//!     --config <FILE>         Generation config (JSON); flags override it
//!     --species <FILE>        Species library (JSON) overriding the presets
//!     --low-power             Software rasterizer profile
//!     -o, --output <FILE>     Write the generated records as JSON
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use sylvan::core::logging;
use sylvan::generation::{GenerationConfig, GenerationStats, TreeGenerator, TreeGeometry};
use sylvan::species::{BuiltinSpecies, ParameterProvider, SpeciesLibrary, TreeType};

fn print_help() {
    eprintln!("generate_tree - Single tree generation utility");
    eprintln!();
    eprintln!("Usage: generate_tree [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -t, --type <TYPE>       Species: apple, sassafras, palm, tamarack, default");
    eprintln!("    --seed <SEED>           Tree seed (default: 1)");
    eprintln!("    --season <SEASON>       Season in [0, 4] (default: 2)");
    eprintln!("    --wind <STRENGTH>       Wind strength (default: 2)");
    eprintln!("    --yaw <DEGREES>         Camera yaw around the tree (default: 30)");
    eprintln!("    --pitch <DEGREES>       Camera pitch above the horizon (default: 10)");
    eprintln!("    --distance <METERS>     Camera distance from the tree (default: 20)");
    eprintln!("    --config <FILE>         Generation config (JSON); flags override it");
    eprintln!("    --species <FILE>        Species library (JSON) overriding the presets");
    eprintln!("    --low-power             Software rasterizer profile");
    eprintln!("    -o, --output <FILE>     Write the generated records as JSON");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    generate_tree -t apple --seed 42 --season 2.6 -o apple.json");
    eprintln!("    generate_tree --config scene.json --distance 80");
}

#[derive(Debug, Default)]
struct Args {
    tree_type: Option<TreeType>,
    seed: Option<u32>,
    season: Option<f32>,
    wind: Option<f32>,
    yaw: Option<f32>,
    pitch: Option<f32>,
    distance: Option<f32>,
    config: Option<PathBuf>,
    species: Option<PathBuf>,
    low_power: bool,
    output: Option<PathBuf>,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = value(args, i, flag)?;
    raw.parse().map_err(|_| format!("Invalid value for {}: {}", flag, raw))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut parsed = Args::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-t" | "--type" => {
                i += 1;
                let raw = value(&args, i, flag)?;
                parsed.tree_type = Some(raw.parse().map_err(|e| format!("{}", e))?);
            }
            "--seed" => {
                i += 1;
                parsed.seed = Some(parse(&args, i, flag)?);
            }
            "--season" => {
                i += 1;
                parsed.season = Some(parse(&args, i, flag)?);
            }
            "--wind" => {
                i += 1;
                parsed.wind = Some(parse(&args, i, flag)?);
            }
            "--yaw" => {
                i += 1;
                parsed.yaw = Some(parse(&args, i, flag)?);
            }
            "--pitch" => {
                i += 1;
                parsed.pitch = Some(parse(&args, i, flag)?);
            }
            "--distance" => {
                i += 1;
                parsed.distance = Some(parse(&args, i, flag)?);
            }
            "--config" => {
                i += 1;
                parsed.config = Some(PathBuf::from(value(&args, i, flag)?));
            }
            "--species" => {
                i += 1;
                parsed.species = Some(PathBuf::from(value(&args, i, flag)?));
            }
            "--low-power" => parsed.low_power = true,
            "-o" | "--output" => {
                i += 1;
                parsed.output = Some(PathBuf::from(value(&args, i, flag)?));
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

fn build_config(args: &Args) -> sylvan::core::Result<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None if args.low_power => GenerationConfig::low_power(),
        None => GenerationConfig::default(),
    };
    if args.low_power {
        let profile = GenerationConfig::low_power();
        config.lod = profile.lod;
        config.workers_per_group = profile.workers_per_group;
    }

    if let Some(tree_type) = args.tree_type {
        config.tree_type = tree_type;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(season) = args.season {
        config.environment.season = season;
    }
    if let Some(wind) = args.wind {
        config.environment.wind_strength = wind;
    }
    if let Some(yaw) = args.yaw {
        config.camera.yaw = yaw;
    }
    if let Some(pitch) = args.pitch {
        config.camera.pitch = pitch;
    }
    if let Some(distance) = args.distance {
        config.camera.distance = distance;
    }
    config.validate()?;
    Ok(config)
}

/// JSON report written by `--output`.
#[derive(Serialize)]
struct Report<'a> {
    config: &'a GenerationConfig,
    geometry: &'a TreeGeometry,
}

fn print_summary(config: &GenerationConfig, geometry: &TreeGeometry) {
    let stats: &GenerationStats = &geometry.stats;

    println!("Tree Generation Utility");
    println!("=======================");
    println!("Species: {}", config.tree_type);
    println!("Seed: {}", config.seed);
    println!("Season: {:.2}", config.environment.season);
    println!(
        "Camera: yaw {:.0}, pitch {:.0}, distance {:.1}m",
        config.camera.yaw, config.camera.pitch, config.camera.distance
    );
    println!();
    println!("Tasks per level: {:?}", stats.tasks_per_level);
    println!(
        "Segments: {} visible, {} culled, {} requested",
        geometry.segments.len(),
        stats.segments_culled,
        stats.segments_requested
    );
    println!(
        "Leaves: {}  Blossoms: {}  Fruits: {}",
        geometry.leaves.len(),
        geometry.blossoms.len(),
        geometry.fruits.len()
    );
    let triangles: u64 = geometry
        .segments
        .iter()
        .map(|segment| segment.plan.ring_counts().total_triangle_count() as u64)
        .sum();
    println!("Stem triangles: {}", triangles);
    if stats.total_dropped() > 0 {
        println!("Dropped by capacity: {}", stats.total_dropped());
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    logging::init();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let species: Box<dyn ParameterProvider> = match &args.species {
        Some(path) => match SpeciesLibrary::load(path) {
            Ok(library) => Box::new(library),
            Err(e) => {
                eprintln!("Error loading species library: {}", e);
                std::process::exit(1);
            }
        },
        None => Box::new(BuiltinSpecies),
    };

    let generator = TreeGenerator::new(config, species.as_ref());
    let geometry = generator.generate();
    print_summary(generator.config(), &geometry);

    if let Some(path) = &args.output {
        let report = Report {
            config: generator.config(),
            geometry: &geometry,
        };
        let written = serde_json::to_string_pretty(&report)
            .map_err(sylvan::core::Error::from)
            .and_then(|json| std::fs::write(path, json).map_err(sylvan::core::Error::from));
        match written {
            Ok(()) => println!("Output: {}", path.display()),
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
