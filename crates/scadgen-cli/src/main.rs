//! scadgen CLI - compile JSON scene files into OpenSCAD source
//!
//! Acts as the host engine: every node in the scene file is created and
//! attached through the scene tree's mutation API, then the tree is
//! committed to disk or printed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use scadgen::{RootConfig, ScadRoot};
use std::path::{Path, PathBuf};

mod scene;

use scene::SceneFile;

#[derive(Parser)]
#[command(name = "scadgen")]
#[command(about = "Compile scene descriptions into OpenSCAD source", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate OpenSCAD source from a scene file
    Build {
        /// Input scene file (.json)
        scene: PathBuf,
        /// Output .scad file (default: stdout, or `output` from the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the kind and generated size of every node
    Report {
        /// Input scene file (.json)
        scene: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            scene,
            output,
            config,
        } => build(&scene, output, config)?,
        Commands::Report { scene, json } => report(&scene, json)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn build(scene: &Path, output: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let mut config = match config {
        Some(path) => RootConfig::load(path)?,
        None => RootConfig::default(),
    };
    if output.is_some() {
        config.output = output;
    }

    let scene = SceneFile::load(scene)?;
    let mut root = ScadRoot::from_config(&config);
    match root.render(|tree| scene.mount(tree))? {
        Some(summary) => println!(
            "Wrote {} ({} bytes)",
            summary.path.display(),
            summary.bytes
        ),
        None => println!("{}", root.to_text()),
    }
    Ok(())
}

fn report(scene: &Path, json: bool) -> Result<()> {
    let scene = SceneFile::load(scene)?;
    let mut root = ScadRoot::new();
    root.render(|tree| scene.mount(tree))?;

    let report = root.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
