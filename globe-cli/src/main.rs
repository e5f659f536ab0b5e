//! Globe: workspace orchestrator CLI.
//!
//! # Usage
//!
//! ```text
//! globe start <app>     sync the app and keep it synced while its dev loop runs
//! globe build <app>     sync into a fresh build location and build
//! globe deploy <app>    build, then deploy
//! globe clean           remove every location and the workspace state file
//! globe [-q] ...        quiet: print only a JSON result document
//! ```

mod commands;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use globe_core::Context;

use commands::{build::BuildMode, AppArgs};
use output::Output;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "globe",
    version,
    about = "Sync workspace packages into per-app locations and drive their platforms",
    long_about = None,
)]
struct Cli {
    /// Suppress progress output and print a JSON result instead.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the dev environment for an app and resync on every edit.
    Start(AppArgs),

    /// Run a build for an app in a fresh location.
    Build(AppArgs),

    /// Build an app, then deploy it.
    Deploy(AppArgs),

    /// Wipe out all derived app data and the workspace state file.
    Clean,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    globe_watch::init_tracing(cli.quiet);
    let out = Output::new(cli.quiet);

    let ctx = Context::from_env().context("could not resolve workspace and home directories")?;
    tracing::debug!(workspace = %ctx.workspace_root.display(), "resolved workspace");
    if let Some(dir) = &ctx.extend_override {
        tracing::info!(dir = %dir.display(), "extends module override active");
        out.warn(format!(
            "Using extendsGlobeModule from {} ({}). You are responsible for synchronization of the extended globe dir!",
            globe_core::paths::EXTEND_OVERRIDE_ENV,
            dir.display()
        ));
    }

    match cli.command {
        Commands::Start(args) => commands::start::run(args, &ctx, &out),
        Commands::Build(args) => commands::build::run(args, BuildMode::Build, &ctx, &out),
        Commands::Deploy(args) => commands::build::run(args, BuildMode::Deploy, &ctx, &out),
        Commands::Clean => commands::clean::run(&ctx, &out),
    }
}
