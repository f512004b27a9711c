//! tile-anneal - search tile layouts by simulated annealing
//!
//! Randomizes a grid, anneals it to maximize the obstacles reachable from
//! the source cell, writes a PNG frame for every new best score, and
//! assembles the frames into a looping GIF.
//!
//! # Usage
//!
//! ```bash
//! # Default run: 12x12 grid, source at (11, 11), 1,000,000 steps
//! tile-anneal
//!
//! # Config file plus overrides
//! tile-anneal --config run.toml --iterations 200000 --seed 42
//!
//! # Stop early after 30 seconds, keep whatever was found
//! tile-anneal --time-limit 30
//!
//! # Verbose logging
//! RUST_LOG=tile_anneal=debug tile-anneal
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use tile_anneal::anneal::AnnealRunner;
use tile_anneal::config::RunConfig;
use tile_anneal::grid::{Grid, ProtectionPolicy, Traversal};
use tile_anneal::render::{export_animation, prepare_output_dir, FrameWriter};

/// Search tile layouts that maximize obstacles reachable from a source cell
#[derive(Parser, Debug)]
#[command(name = "tile-anneal")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long, env = "TILE_ANNEAL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Source cell row
    #[arg(long)]
    source_row: Option<usize>,

    /// Source cell column
    #[arg(long)]
    source_col: Option<usize>,

    /// Number of annealing steps
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Geometric cooling factor in (0, 1)
    #[arg(long)]
    cooling: Option<f64>,

    /// Random seed
    #[arg(short = 's', long, env = "TILE_ANNEAL_SEED")]
    seed: Option<u64>,

    /// Which path tiles may never become obstacles
    #[arg(long, value_enum)]
    protection: Option<ProtectionArg>,

    /// Connectivity traversal strategy
    #[arg(long, value_enum)]
    traversal: Option<TraversalArg>,

    /// Directory receiving one PNG per improvement (cleared at start)
    #[arg(long, value_name = "DIR")]
    frames_dir: Option<PathBuf>,

    /// Output GIF path
    #[arg(short = 'o', long, value_name = "FILE")]
    animation: Option<PathBuf>,

    /// Frame delay in hundredths of a second
    #[arg(long)]
    frame_delay: Option<u32>,

    /// Pixels per tile edge
    #[arg(long)]
    scale: Option<u32>,

    /// Skip GIF assembly after the search
    #[arg(long)]
    no_animation: bool,

    /// Stop the search after this many seconds
    #[arg(long, value_name = "SECS")]
    time_limit: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "TILE_ANNEAL_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProtectionArg {
    /// Protect the source's whole row and column
    SourceLines,
    /// Protect only the source cell
    SourceOnly,
}

impl From<ProtectionArg> for ProtectionPolicy {
    fn from(arg: ProtectionArg) -> Self {
        match arg {
            ProtectionArg::SourceLines => ProtectionPolicy::SourceLines,
            ProtectionArg::SourceOnly => ProtectionPolicy::SourceOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TraversalArg {
    Recursive,
    Stack,
}

impl From<TraversalArg> for Traversal {
    fn from(arg: TraversalArg) -> Self {
        match arg {
            TraversalArg::Recursive => Traversal::Recursive,
            TraversalArg::Stack => Traversal::Stack,
        }
    }
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("tile_anneal={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// File config (or defaults) with CLI overrides applied, then validated.
fn resolve_config(args: &Args) -> Result<RunConfig> {
    let mut config = match args.config {
        Some(ref path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => RunConfig::default(),
    };

    let grid = &mut config.grid;
    if let Some(rows) = args.rows {
        grid.rows = rows;
    }
    if let Some(cols) = args.cols {
        grid.cols = cols;
    }
    if let Some(row) = args.source_row {
        grid.source.row = row;
    }
    if let Some(col) = args.source_col {
        grid.source.col = col;
    }
    if let Some(protection) = args.protection {
        grid.protection = protection.into();
    }

    let anneal = &mut config.anneal;
    if let Some(n) = args.iterations {
        anneal.iterations = n;
    }
    if let Some(alpha) = args.cooling {
        anneal.cooling_factor = alpha;
    }
    if let Some(seed) = args.seed {
        anneal.seed = Some(seed);
    }
    if let Some(traversal) = args.traversal {
        anneal.traversal = traversal.into();
    }

    let output = &mut config.output;
    if let Some(ref dir) = args.frames_dir {
        output.frames_dir = dir.clone();
    }
    if let Some(ref path) = args.animation {
        output.animation_path = path.clone();
    }
    if let Some(delay) = args.frame_delay {
        output.frame_delay = delay;
    }
    if let Some(scale) = args.scale {
        output.scale = scale;
    }

    config.validate().context("Invalid run configuration")?;
    Ok(config)
}

/// Raises `cancel` after `secs` seconds.
fn spawn_deadline(secs: u64, cancel: Arc<AtomicBool>) {
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(secs));
        info!(secs, "time limit reached, stopping search");
        cancel.store(true, Ordering::Relaxed);
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = resolve_config(&args)?;
    let anneal = config.anneal_config();
    let output = &config.output;

    let mut rng = anneal.rng();
    let g = &config.grid;
    let mut grid = Grid::random(g.rows, g.cols, g.source, &mut rng)
        .context("Failed to create grid")?
        .with_protection(g.protection);

    prepare_output_dir(&output.frames_dir);

    let cancel = Arc::new(AtomicBool::new(false));
    if let Some(secs) = args.time_limit {
        spawn_deadline(secs, Arc::clone(&cancel));
    }

    let mut writer =
        FrameWriter::spawn(output.frames_dir.clone(), output.scale, output.queue_capacity);
    let result =
        AnnealRunner::run_with_cancel(&mut grid, &anneal, &mut rng, &mut writer, Some(cancel))
            .context("Annealing failed")?;

    match writer.finish() {
        Ok(written) => info!(written, "frames written"),
        Err(e) => error!(error = %e, "frame output incomplete"),
    }

    println!("Best number of reachable obstacles: {}", result.best_score);
    print!("{}", result.best);

    if !args.no_animation {
        if result.improvements == 0 {
            warn!("no improvements found, skipping animation");
        } else {
            let frames = export_animation(
                &output.frames_dir,
                &output.animation_path,
                output.frame_delay,
            )
            .with_context(|| {
                format!("Failed to export animation: {}", output.animation_path.display())
            })?;
            println!(
                "Animation with {frames} frames written to {}",
                output.animation_path.display()
            );
        }
    }

    Ok(())
}
