//! DAT -> JSON converter
//!
//! Converts every DAT dataset in a directory that has no JSON sibling yet.
//!
//! Usage:
//!   cargo run --bin convert                        # analysis/data
//!   cargo run --bin convert -- --dir path/to/data
//!   cargo run --bin convert -- --file Data-3.dat   # single file, overwrites JSON

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use realm_heatmaps::files::sibling_with_extension;
use realm_heatmaps::{DATA_DIRECTORY, convert_dat_to_json, sync_directory};

#[derive(Debug, Parser)]
#[command(name = "convert", about = "Convert DAT episode datasets to JSON")]
struct Args {
    /// Directory to sync
    #[arg(long, default_value = DATA_DIRECTORY)]
    dir: PathBuf,
    /// Convert one file instead of syncing a directory
    #[arg(long, conflicts_with = "dir")]
    file: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), String> {
    if let Some(dat) = args.file {
        let json = sibling_with_extension(&dat, "json");
        let episodes = convert_dat_to_json(&dat, &json)
            .map_err(|e| format!("Failed to convert {}: {}", dat.display(), e))?;
        println!("{} -> {} ({} episodes)", dat.display(), json.display(), episodes);
        return Ok(());
    }

    if !args.dir.is_dir() {
        return Err(format!("{} is not a directory", args.dir.display()));
    }

    let report = sync_directory(&args.dir);
    println!(
        "{}: {} converted, {} already converted, {} failed",
        args.dir.display(),
        report.converted.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for path in &report.converted {
        println!("  + {}", path.display());
    }
    for (path, reason) in &report.failed {
        eprintln!("  ! {}: {}", path.display(), reason);
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} files failed to convert", report.failed.len()))
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
