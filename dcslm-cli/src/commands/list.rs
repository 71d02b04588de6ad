//! `list` command.

use clap::Args;
use console::style;

use super::common::{format_size, Session};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print the registry entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ListArgs, session: Session) -> Result<(), CliError> {
    let liveries = session.registry.list();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&liveries)?);
        return Ok(());
    }

    if liveries.is_empty() {
        println!("No liveries installed.");
        return Ok(());
    }

    println!(
        "{:<10} {:<40} {:>10}  {:<9}  {}",
        "ID", "Title", "Size", "Optimized", "Units"
    );
    for livery in liveries {
        let optimized = if livery.optimized { "yes" } else { "no" };
        let line = format!(
            "{:<10} {:<40} {:>10}  {:<9}  {}",
            livery.id,
            livery.title(),
            format_size(livery.installed_size()),
            optimized,
            livery.target_units.join(", ")
        );
        if session.registry.is_installed(livery) {
            println!("{}", line);
        } else {
            println!("{} {}", line, style("(files missing)").yellow());
        }
    }

    Ok(())
}
