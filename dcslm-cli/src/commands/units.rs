//! `units` command: show the unit catalog.

use std::path::PathBuf;

use clap::Args;

use dcslm::config::ConfigFile;
use dcslm::units::UnitCatalog;

use super::common::load_catalog;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct UnitsArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: UnitsArgs, config: &ConfigFile, root: Option<PathBuf>) -> Result<(), CliError> {
    let catalog = load_catalog(&config.manager_config(root));
    let units = catalog.units();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    println!("{:<14} {:<22} {}", "Unit", "Name", "Install folders");
    for unit in units {
        println!(
            "{:<14} {:<22} {}",
            unit.generic_name,
            unit.friendly_name,
            unit.install_folders.join(", ")
        );
    }
    Ok(())
}
