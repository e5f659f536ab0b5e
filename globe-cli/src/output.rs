//! Human progress lines vs. the quiet JSON result document.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use globe_sync::SyncReport;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn heading(&self, msg: &str) {
        if !self.quiet {
            println!("{} {}", "🌐".cyan(), msg.bold());
        }
    }

    pub fn progress(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("   {}", msg.as_ref());
        }
    }

    /// Warnings go to stderr and are never suppressed.
    pub fn warn(&self, msg: impl AsRef<str>) {
        eprintln!("{} {}", "⚠".yellow().bold(), msg.as_ref());
    }

    pub fn synced(&self, report: &SyncReport) {
        self.progress(format!(
            "{} {} package(s): {} copied, {} unchanged, {} deleted{}",
            "✓".green().bold(),
            report.packages.len(),
            report.copied,
            report.unchanged,
            report.deleted,
            if report.removed.is_empty() {
                String::new()
            } else {
                format!(", evicted {}", report.removed.join(", "))
            }
        ));
    }

    pub fn done(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", "✓".green().bold(), msg.as_ref());
        }
    }

    /// In quiet mode, print `value` as the JSON result document.
    pub fn result<T: Serialize>(&self, value: &T) -> Result<()> {
        if self.quiet {
            let json = serde_json::to_string_pretty(value).context("failed to serialize result")?;
            println!("{json}");
        }
        Ok(())
    }
}
