//! Assay CLI
//!
//! Simulate, check, and scaffold motion scenes without a browser.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod project;
mod simulate;

use config::SceneConfig;
use simulate::SimulateOptions;

#[derive(Parser)]
#[command(name = "assay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assay motion scene tool", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene headless and print what each element shows
    Simulate {
        /// Scene file or directory containing scene.toml
        #[arg(default_value = ".")]
        scene: String,

        /// Tick rate override
        #[arg(long)]
        hz: Option<f64>,

        /// Run length override, in seconds
        #[arg(long)]
        seconds: Option<f64>,

        /// Print every n-th frame
        #[arg(long, default_value = "1")]
        every: usize,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Refuse to run a scene with configuration problems
        #[arg(long)]
        strict: bool,
    },

    /// Check a scene for configuration problems
    Check {
        /// Scene file or directory containing scene.toml
        #[arg(default_value = ".")]
        scene: String,
    },

    /// Write a sample scene.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: String,

        /// Scene name
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            scene,
            hz,
            seconds,
            every,
            json,
            strict,
        } => cmd_simulate(
            &scene,
            SimulateOptions { hz, seconds, every },
            json,
            strict,
        ),

        Commands::Check { scene } => cmd_check(&scene),

        Commands::Init { dir, name } => cmd_init(&dir, name.as_deref()),
    }
}

fn cmd_simulate(source: &str, options: SimulateOptions, json: bool, strict: bool) -> Result<()> {
    let scene = SceneConfig::load(&PathBuf::from(source))?;

    let problems = scene.validate();
    for problem in &problems {
        warn!("{}", problem);
    }
    if strict && !problems.is_empty() {
        anyhow::bail!("{} problem(s) in scene, refusing to run", problems.len());
    }

    let samples = simulate::run(&scene, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
    } else {
        print!("{}", simulate::render_text(&samples));
    }

    Ok(())
}

fn cmd_check(source: &str) -> Result<()> {
    let scene = SceneConfig::load(&PathBuf::from(source))?;

    info!("Checking scene {}", scene.scene.name);
    for counter in &scene.counters {
        info!(
            "  counter {} -> {} over {}s",
            counter.id,
            counter.format().format(counter.target),
            counter.duration
        );
    }
    info!(
        "  {} stagger group(s), {} spotlight(s), {} loop(s)",
        scene.staggers.len(),
        scene.spotlights.len(),
        scene.loops.len()
    );

    let problems = scene.validate();
    if problems.is_empty() {
        info!("Scene OK");
        return Ok(());
    }

    for problem in &problems {
        warn!("{}", problem);
    }
    anyhow::bail!("{} problem(s) found", problems.len())
}

fn cmd_init(dir: &str, name: Option<&str>) -> Result<()> {
    let dir = PathBuf::from(dir);
    let name = match name {
        Some(name) => name.to_string(),
        None => dir
            .canonicalize()
            .ok()
            .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "scene".to_string()),
    };

    let path = project::create_scene(&dir, &name)?;
    info!("Created {}", path.display());
    info!("Run `assay simulate {}` to try it", path.display());

    Ok(())
}
