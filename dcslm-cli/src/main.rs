//! DCSLM command-line interface.
//!
//! Installs livery archives into a DCS World saved-games folder, tracks them
//! in a registry and deduplicates their textures.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use console::style;

use dcslm::config::ConfigFile;
use dcslm::logging::{init_logging, LogConfig};

use commands::common::Session;
use commands::config::ConfigCommands;
use commands::install::InstallArgs;
use commands::list::ListArgs;
use commands::mode::ModeArgs;
use commands::optimize::OptimizeArgs;
use commands::uninstall::UninstallArgs;
use commands::units::UnitsArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "dcslm", version, about = "DCS World livery manager")]
struct Cli {
    /// Game saved-games folder (overrides paths.root_dir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install liveries from archives or download links
    Install(InstallArgs),

    /// Remove installed liveries
    Uninstall(UninstallArgs),

    /// List installed liveries
    List(ListArgs),

    /// Deduplicate the textures of installed liveries
    Optimize(OptimizeArgs),

    /// Rebuild the registry from sidecar files
    Scan,

    /// Show the units liveries can be installed for
    Units(UnitsArgs),

    /// Show or switch mod-manager mode
    Mode(ModeArgs),

    /// View or change configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let config = match ConfigFile::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}, using defaults", style("Warning:").yellow().bold(), e);
            ConfigFile::default()
        }
    };

    // Held until exit so the log file is flushed.
    let _log_guard = match init_logging(&log_config(&cli, &config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {}", style("Warning:").yellow().bold(), e);
            None
        }
    };

    if let Err(e) = run(cli, config) {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli, config: ConfigFile) -> Result<(), CliError> {
    match cli.command {
        Commands::Config(command) => commands::config::run(command),
        Commands::Units(args) => commands::units::run(args, &config, cli.root),
        Commands::Install(args) => commands::install::run(args, Session::open(config, cli.root)?),
        Commands::Uninstall(args) => {
            commands::uninstall::run(args, Session::open(config, cli.root)?)
        }
        Commands::List(args) => commands::list::run(args, Session::open(config, cli.root)?),
        Commands::Optimize(args) => {
            commands::optimize::run(args, Session::open(config, cli.root)?)
        }
        Commands::Scan => commands::scan::run(Session::open(config, cli.root)?),
        Commands::Mode(args) => commands::mode::run(args, Session::open(config, cli.root)?),
    }
}

/// Logging settings from the config file and `-v` flags.
fn log_config(cli: &Cli, config: &ConfigFile) -> LogConfig {
    let level = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let mut log = LogConfig::new(level);

    let work = config.manager_config(cli.root.clone()).work_path();
    if let Some(file) = &config.logging.file {
        if work.is_dir() {
            log = log.with_file(work.join(file));
        }
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from([
            "dcslm", "--root", "/games/dcs", "install", "pack.zip", "-u", "f-16c", "-u", "fa-18c",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/games/dcs")));
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.sources, vec!["pack.zip"]);
                assert_eq!(args.units, vec!["f-16c", "fa-18c"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_install_requires_unit() {
        assert!(Cli::try_parse_from(["dcslm", "install", "pack.zip"]).is_err());
    }

    #[test]
    fn test_optimize_all_conflicts_with_ids() {
        assert!(Cli::try_parse_from(["dcslm", "optimize", "--all", "10000001"]).is_err());
        assert!(Cli::try_parse_from(["dcslm", "optimize", "--all", "--check"]).is_ok());
    }

    #[test]
    fn test_verbose_selects_level() {
        let cli = Cli::try_parse_from(["dcslm", "-vv", "list"]).unwrap();
        let log = log_config(&cli, &ConfigFile::default());
        assert_eq!(log.level, "trace");
    }
}
