//! `globe clean`: remove `~/.globe` and the workspace state file.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

use globe_core::{state, Context};

use crate::output::Output;

#[derive(Debug, Serialize)]
struct CleanResult {
    removed: Vec<PathBuf>,
}

pub fn run(ctx: &Context, out: &Output) -> Result<()> {
    out.heading("Globe Clean");
    out.progress(
        "Cleaning all globe apps and state. The working directory is untouched \
         except for the local .globe.state.json file.",
    );
    let removed = state::clean_at(ctx).context("clean failed")?;
    for path in &removed {
        out.progress(format!("removed {}", path.display()));
    }
    out.done("Clean complete");
    out.result(&CleanResult { removed })
}
