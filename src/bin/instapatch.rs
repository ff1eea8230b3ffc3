// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use instapatch::{
    driver::{self, DriverError, Options},
    path::expand,
    patch::Registry,
    term::StdTerminal,
};

use anyhow::Result;
use clap::Parser;
use std::process::exit;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when the user cancels a prompt.
const CANCELLED: i32 = 130;

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  instapatch [options] <install> <patch>...\n  instapatch --list",
    version
)]
struct Cli {
    /// Path to installation root.
    #[arg(required_unless_present = "list", value_name = "install")]
    pub install: Option<String>,

    /// Names of patches to apply, in order.
    #[arg(required_unless_present = "list", value_name = "patch")]
    pub patches: Vec<String>,

    /// Write replay script to path (.bat or .cmd).
    #[arg(short, long, value_name = "file")]
    pub output: Option<String>,

    /// Report changes without touching the installation.
    #[arg(short, long)]
    pub dry_run: bool,

    /// List available patches and exit.
    #[arg(short, long, conflicts_with_all = ["install", "patches", "output", "dry_run"])]
    pub list: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let registry = Registry::builtin();
        if self.list {
            driver::list(&registry, &mut StdTerminal::new());
            return Ok(());
        }

        let options = Options {
            install: expand(self.install.unwrap_or_default())?,
            patches: self.patches,
            output: self.output.map(expand).transpose()?,
            dry_run: self.dry_run,
        };
        debug!("run with {options:?}");

        driver::run(&options, &registry, StdTerminal::new())?;

        Ok(())
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        // INVARIANT: Cancelled runs exit quietly with their own status.
        if error
            .downcast_ref::<DriverError>()
            .is_some_and(DriverError::is_cancelled)
        {
            exit(CANCELLED);
        }

        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}
