//! `uninstall` command.

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::warn;

use super::common::{select_ids, Session};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Ids of the liveries to remove
    pub ids: Vec<u64>,

    /// Remove every registered livery
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Keep the installed files and only forget the liveries
    #[arg(long)]
    pub keep: bool,

    /// Do not ask for confirmation with --all
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run(args: UninstallArgs, mut session: Session) -> Result<(), CliError> {
    let ids = select_ids(&session.registry, &args.ids, args.all)?;
    if ids.is_empty() {
        println!("No liveries installed.");
        return Ok(());
    }

    if args.all && !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Uninstall all {} liveries?", ids.len()))
            .default(false)
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))?;
        if !confirmed {
            println!("Nothing removed.");
            return Ok(());
        }
    }

    let mut failed = 0;
    for &id in &ids {
        match session.registry.uninstall(id, args.keep) {
            Ok(livery) => println!(
                "{} {} ({})",
                style("Removed").green().bold(),
                livery.title(),
                livery.id
            ),
            Err(e) => {
                failed += 1;
                warn!(id = id, error = %e, "Uninstall failed");
                eprintln!("{} {}: {}", style("Failed").red().bold(), id, e);
            }
        }
    }

    session.registry.save()?;

    if failed > 0 {
        return Err(CliError::Failed {
            failed,
            total: ids.len(),
        });
    }
    Ok(())
}
