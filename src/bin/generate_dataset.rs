//! Synthetic dataset generator
//!
//! Writes random-walk episodes as `Data-<id>.dat` and/or `Data-<id>.json` so
//! the server can be exercised without recorded training runs.
//!
//! Usage:
//!   cargo run --bin generate_dataset -- --id 1
//!   cargo run --bin generate_dataset -- --id 7 --episodes 500 --format json --seed 42

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

use realm_heatmaps::{DATA_DIRECTORY, EpisodeRecord, Position, dataset_json_path, write_dat, write_json};

// Random walk shape
const MIN_STEPS: usize = 20;
const STEP_SIZE: f32 = 0.05;
const ARENA_HALF_EXTENT: f32 = 5.0;
const STEP_SECONDS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Dat,
    Json,
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "generate_dataset", about = "Write a synthetic episode dataset")]
struct Args {
    /// Dataset id, used as Data-<id>
    #[arg(long)]
    id: String,
    #[arg(long, default_value = DATA_DIRECTORY)]
    dir: PathBuf,
    #[arg(long, default_value_t = 200)]
    episodes: usize,
    /// Upper bound on steps per episode
    #[arg(long, default_value_t = 400)]
    max_steps: usize,
    #[arg(long, value_enum, default_value_t = Format::Both)]
    format: Format,
    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// One episode wandering from a random start; reward favors ending near the origin
fn random_episode(rng: &mut StdRng, episode_number: i32, max_steps: usize) -> EpisodeRecord {
    let steps = rng.gen_range(MIN_STEPS..=max_steps.max(MIN_STEPS));
    let mut x = rng.gen_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT);
    let mut y = rng.gen_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT);
    let mut heading: f32 = rng.gen_range(0.0..std::f32::consts::TAU);

    let mut positions = Vec::with_capacity(steps);
    for _ in 0..steps {
        heading += rng.gen_range(-0.6..0.6);
        x = (x + heading.cos() * STEP_SIZE).clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
        y = (y + heading.sin() * STEP_SIZE).clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
        positions.push(Position::new(x, y));
    }

    let distance = (x * x + y * y).sqrt();
    EpisodeRecord {
        episode_number,
        duration: steps as f32 * STEP_SECONDS,
        reward: ARENA_HALF_EXTENT - distance + rng.gen_range(-0.5..0.5),
        positions,
    }
}

fn run(args: Args) -> Result<(), String> {
    if args.episodes == 0 {
        return Err("--episodes must be positive".to_string());
    }
    realm_heatmaps::heatmap::validate_dat_id(&args.id).map_err(|e| e.to_string())?;
    fs::create_dir_all(&args.dir)
        .map_err(|e| format!("Failed to create {}: {}", args.dir.display(), e))?;

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..u64::MAX));
    let mut rng = StdRng::seed_from_u64(seed);
    let records: Vec<EpisodeRecord> = (1..=args.episodes)
        .map(|n| random_episode(&mut rng, n as i32, args.max_steps))
        .collect();

    let json_path = dataset_json_path(&args.dir, &args.id);
    let dat_path = json_path.with_extension("dat");
    if matches!(args.format, Format::Dat | Format::Both) {
        write_dat(&dat_path, &records)
            .map_err(|e| format!("Failed to write {}: {}", dat_path.display(), e))?;
        println!("Wrote {}", dat_path.display());
    }
    if matches!(args.format, Format::Json | Format::Both) {
        write_json(&json_path, &records)
            .map_err(|e| format!("Failed to write {}: {}", json_path.display(), e))?;
        println!("Wrote {}", json_path.display());
    }

    let samples: usize = records.iter().map(EpisodeRecord::sample_count).sum();
    println!("{} episodes, {} samples (seed: {})", records.len(), samples, seed);
    Ok(())
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
