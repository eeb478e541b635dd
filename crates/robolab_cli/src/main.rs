//! Robolab CLI
//!
//! Run headless robot sessions from a command script and inspect
//! configuration files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use robolab_platform::Viewport;
use robolab_viewer::{Notification, RobotViewer, ViewerConfig};
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod script;

use script::Script;

#[derive(Parser)]
#[command(name = "robolab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Robolab robot viewer CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless session, printing notifications as JSON lines
    Run {
        /// Command script (JSON array of timed steps)
        script: Option<PathBuf>,

        /// Viewer configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Session length in seconds; defaults to one second past the last step
        #[arg(short, long)]
        duration: Option<f64>,

        /// Simulated frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Seed for spawns and blinks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the default configuration, or validate a file
    Config {
        /// Configuration file to validate
        #[arg(long)]
        check: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            script,
            config,
            duration,
            fps,
            seed,
        } => cmd_run(script.as_deref(), config.as_deref(), duration, fps, seed),

        Commands::Config { check } => cmd_config(check.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(ViewerConfig::default()),
    }
}

/// Output line: the notification plus the frame time it was published at
#[derive(Serialize)]
struct Line<'a> {
    t: f64,
    #[serde(flatten)]
    notification: &'a Notification,
}

fn cmd_run(
    script_path: Option<&Path>,
    config_path: Option<&Path>,
    duration: Option<f64>,
    fps: u32,
    seed: Option<u64>,
) -> Result<()> {
    if fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }
    let mut config = load_config(config_path)?;
    if seed.is_some() {
        config.rng_seed = seed;
    }
    let mut script = match script_path {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };
    let duration = duration.unwrap_or(script.end_time() + 1.0);
    if !duration.is_finite() || duration < 0.0 {
        anyhow::bail!("Invalid duration {}", duration);
    }

    let viewport = Viewport::new(config.render.width, config.render.height)
        .context("Invalid render size")?;
    let mut viewer = RobotViewer::headless(config).context("Failed to create viewer")?;
    let published = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&published);
    viewer.subscribe(move |n: &Notification| sink.borrow_mut().push(n.clone()));
    viewer.mount(viewport).context("Failed to mount viewer")?;

    info!(
        steps = script.len(),
        duration,
        fps,
        "Running headless session"
    );

    let frames = (duration * f64::from(fps)).ceil() as u64;
    for frame in 0..=frames {
        let t = frame as f64 / f64::from(fps);
        for step in script.due(t) {
            if !viewer.dispatch_named(&step.command, &step.payload) {
                warn!(at = step.at, command = %step.command, "Skipped script step");
            }
        }
        viewer.frame(t)?;

        for notification in published.borrow_mut().drain(..) {
            let line = serde_json::to_string(&Line {
                t,
                notification: &notification,
            })?;
            println!("{}", line);
        }
    }

    if !script.is_finished() {
        warn!("Session ended before every script step ran");
    }
    info!(
        frames = viewer.backend().frames_rendered(),
        score = viewer.score(),
        "Session finished"
    );
    viewer.unmount();
    Ok(())
}

fn cmd_config(check: Option<&Path>) -> Result<()> {
    match check {
        Some(path) => {
            load_config(Some(path))?;
            info!("{} is valid", path.display());
        }
        None => {
            let text = ViewerConfig::default()
                .to_toml_string()
                .context("Failed to serialize default configuration")?;
            print!("{}", text);
        }
    }
    Ok(())
}
