//! Realm Heatmaps server
//!
//! Usage:
//!   cargo run                                   # config/server.toml or defaults
//!   cargo run -- --bind 0.0.0.0:5000 --preload
//!   cargo run -- --settings my.toml --grid-width 128 --grid-height 128
//!   cargo run -- --intensity-scale linear
//!
//! Log level follows RUST_LOG (default: info).

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use realm_heatmaps::{
    AppState, HeatmapService, IntensityScale, SETTINGS_FILE, ServerSettings, router,
};

#[derive(Debug, Parser)]
#[command(name = "realm_heatmaps", about = "Serve episode position heatmaps over HTTP")]
struct Args {
    /// Settings file (missing file means defaults)
    #[arg(long, default_value = SETTINGS_FILE)]
    settings: PathBuf,
    /// Address to bind, e.g. 127.0.0.1:5000
    #[arg(long)]
    bind: Option<String>,
    /// Directory listed by the file routes
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Directory heatmap JPEGs are written to
    #[arg(long)]
    results_dir: Option<PathBuf>,
    #[arg(long)]
    grid_width: Option<u32>,
    #[arg(long)]
    grid_height: Option<u32>,
    /// Pixels per grid cell
    #[arg(long)]
    cell_size: Option<u32>,
    #[arg(long)]
    jpeg_quality: Option<u8>,
    /// How cell counts map to color
    #[arg(long, value_enum)]
    intensity_scale: Option<IntensityScale>,
    /// Font used to caption heatmaps
    #[arg(long)]
    font: Option<PathBuf>,
    /// Convert DAT files and load every dataset before serving
    #[arg(long)]
    preload: bool,
}

impl Args {
    fn apply(self, settings: &mut ServerSettings) {
        if let Some(bind) = self.bind {
            settings.bind_address = bind;
        }
        if let Some(dir) = self.data_dir {
            settings.data_directory = dir;
        }
        if let Some(dir) = self.results_dir {
            settings.results_directory = dir;
        }
        if let Some(w) = self.grid_width {
            settings.grid_width = w;
        }
        if let Some(h) = self.grid_height {
            settings.grid_height = h;
        }
        if let Some(size) = self.cell_size {
            settings.cell_size = size;
        }
        if let Some(q) = self.jpeg_quality {
            settings.jpeg_quality = q;
        }
        if let Some(scale) = self.intensity_scale {
            settings.intensity_scale = scale;
        }
        if self.font.is_some() {
            settings.font_path = self.font;
        }
        settings.preload |= self.preload;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
    }
    info!("Shutting down");
}

async fn run(args: Args) -> Result<(), String> {
    let mut settings = ServerSettings::load(&args.settings).map_err(|e| e.to_string())?;
    args.apply(&mut settings);
    settings.validate().map_err(|e| e.to_string())?;
    let addr = settings.socket_addr().map_err(|e| e.to_string())?;

    let service = HeatmapService::from_settings(&settings)?;
    if settings.preload {
        service.preload_data_directory();
    }

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    info!(
        "Serving heatmaps on http://{} (data: {}, results: {})",
        addr,
        settings.data_directory.display(),
        settings.results_directory.display()
    );

    axum::serve(listener, router(AppState::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
