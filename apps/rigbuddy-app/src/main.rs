//! Rigbuddy command-line front end.
//!
//! Provides three modes of operation:
//! - `layout`: Print the default biped locator layout as TOML
//! - `build`: Build joints from a locator file (or the default layout)
//! - `info`: Print crate versions and the active configuration

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use rigbuddy_core::prelude::*;
use rigbuddy_locators::{mirror_left_to_right, BipedLayout, LocatorSet};
use rigbuddy_skeleton::report::{BuildOutcome, BuildReport};
use rigbuddy_skeleton::{HierarchyBuilder, RigScene};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Build animation rig skeletons from named locators.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default biped locator layout.
    Layout {
        /// Rig config TOML file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Copy left locators onto the right side before printing.
        #[arg(short, long)]
        mirror: bool,
    },

    /// Build the joint hierarchy and print its records.
    Build {
        /// Rig config TOML file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Locator TOML file. Defaults to the biped layout.
        #[arg(short, long)]
        locators: Option<PathBuf>,

        /// Copy left locators onto the right side before building.
        #[arg(short, long)]
        mirror: bool,

        /// Print records and report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print crate information.
    Info {
        /// Rig config TOML file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Rig(#[from] RigError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML output failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Rig(err.into())
    }
}

impl From<LocatorError> for AppError {
    fn from(err: LocatorError) -> Self {
        Self::Rig(err.into())
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<RigConfig, ConfigError> {
    path.map_or_else(|| Ok(RigConfig::default()), |path| RigConfig::from_file(path))
}

fn run_layout(config: &RigConfig, mirror: bool) -> Result<(), AppError> {
    let mut locators = LocatorSet::new();
    BipedLayout::from_config(config).place_into(&mut locators);
    if mirror {
        mirror_left_to_right(&mut locators);
    }
    print!("{}", locators.to_toml_string(&config.naming)?);
    Ok(())
}

fn run_build(
    config: &RigConfig,
    locator_file: Option<&Path>,
    mirror: bool,
    json: bool,
) -> Result<bool, AppError> {
    let mut locators = match locator_file {
        Some(path) => LocatorSet::from_file(path, &config.naming)?,
        None => BipedLayout::from_config(config).locators(),
    };
    if mirror {
        mirror_left_to_right(&mut locators);
    }

    let builder = HierarchyBuilder::new(config)?;
    let mut scene = RigScene::new();
    let report = match builder.create_joints(&mut scene, &locators) {
        BuildOutcome::Built(report) => report,
        BuildOutcome::AlreadyBuilt => BuildReport::default(),
    };

    if json {
        print_json(&scene, &report)?;
    } else {
        print_table(&scene, &report);
    }
    Ok(report.is_complete())
}

fn print_json(scene: &RigScene, report: &BuildReport) -> Result<(), serde_json::Error> {
    let failures: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
    let output = serde_json::json!({
        "joints": scene.records(),
        "chains_built": report.chains_built,
        "failures": failures,
        "warnings": report.warnings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_table(scene: &RigScene, report: &BuildReport) {
    for record in scene.records() {
        let origin = rigbuddy_core::math::translation(&record.offset_parent_matrix);
        println!(
            "{:<20} parent={:<20} offset=({:.4}, {:.4}, {:.4})",
            record.name,
            record.parent.as_deref().unwrap_or("-"),
            origin.x,
            origin.y,
            origin.z
        );
    }
    println!();
    println!(
        "joints={}, chains={}, failures={}, warnings={}",
        report.joints_created,
        report.chains_built.len(),
        report.failures.len(),
        report.warnings.len()
    );
    for failure in &report.failures {
        println!("  failed: {failure}");
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}

fn run_info(config: &RigConfig) {
    println!("rigbuddy v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  rigbuddy-core      {}", env!("CARGO_PKG_VERSION"));
    println!("  rigbuddy-locators  {}", env!("CARGO_PKG_VERSION"));
    println!("  rigbuddy-skeleton  {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("config:");
    println!("  spine_count   {}", config.spine_count);
    println!("  finger_count  {}", config.finger_count);
    println!("  locators      {}_*", config.naming.locator_prefix);
    println!("  joints        {}_*", config.naming.joint_prefix);
    println!("  joint group   {}", config.naming.joint_group);
    println!("  rest storage  {}", config.naming.storage_group);
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<bool, AppError> {
    match cli.command {
        Some(Commands::Layout { config, mirror }) => {
            run_layout(&load_config(config.as_deref())?, mirror)?;
            Ok(true)
        }
        Some(Commands::Build {
            config,
            locators,
            mirror,
            json,
        }) => run_build(
            &load_config(config.as_deref())?,
            locators.as_deref(),
            mirror,
            json,
        ),
        Some(Commands::Info { config }) => {
            run_info(&load_config(config.as_deref())?);
            Ok(true)
        }
        None => {
            // Default: build the default layout
            run_build(&RigConfig::default(), None, false, false)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            tracing::error!(%err, "rigbuddy failed");
            ExitCode::FAILURE
        }
    }
}
