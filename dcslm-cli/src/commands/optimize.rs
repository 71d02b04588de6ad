//! `optimize` command.

use clap::Args;
use console::style;

use dcslm::optimizer::{OptimizeReport, Optimizer};

use super::common::{format_size, select_ids, Session};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct OptimizeArgs {
    /// Ids of the liveries to optimize
    pub ids: Vec<u64>,

    /// Optimize every registered livery
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,

    /// Report duplicates without changing any file
    #[arg(long)]
    pub check: bool,

    /// Run again on liveries that are already optimized
    #[arg(long)]
    pub force: bool,

    /// List unused files instead of deleting them
    #[arg(long)]
    pub keep_unused: bool,

    /// Do not back up configuration files before rewriting them
    #[arg(long)]
    pub no_backup: bool,

    /// Print the reports as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: OptimizeArgs, mut session: Session) -> Result<(), CliError> {
    let ids = select_ids(&session.registry, &args.ids, args.all)?;

    let mut options = session
        .config
        .optimize_options()
        .with_check_only(args.check)
        .with_force(args.force);
    if args.keep_unused {
        options = options.with_keep_unused(true);
    }
    if args.no_backup {
        options = options.with_backup_config(false);
    }

    let results = Optimizer::new(options).optimize_many(&mut session.registry, &ids);

    let mut reports: Vec<OptimizeReport> = Vec::new();
    let mut failed = 0;
    for (id, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", style("Failed").red().bold(), id, e);
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", report);
        }
        let saved: u64 = reports.iter().map(|r| r.bytes_saved()).sum();
        if !args.check && reports.len() > 1 {
            println!("Total saved: {}", format_size(saved));
        }
    }

    if failed > 0 {
        return Err(CliError::Failed {
            failed,
            total: ids.len(),
        });
    }
    Ok(())
}
