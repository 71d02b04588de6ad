//! `install` command.

use std::path::Path;

use clap::Args;
use console::style;

use dcslm::manager::{
    DirectLinkProvider, HttpDownloader, InstallRequest, InstallStage, LiveryInstaller,
    ManagerError,
};

use super::common::{cancel_on_interrupt, format_size, spinner, Session};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Archive files or direct download links
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Unit to install for, by generic name (repeatable, e.g. -u f-16c)
    #[arg(short, long = "unit", required = true)]
    pub units: Vec<String>,

    /// Title to install under instead of the archive name
    #[arg(long)]
    pub title: Option<String>,

    /// Keep downloaded archives in the work directory
    #[arg(long)]
    pub keep_archive: bool,
}

/// Build one install request per source.
///
/// Existing files are installed as local archives; anything else is treated
/// as a remote identifier.
pub fn requests(args: &InstallArgs) -> Result<Vec<InstallRequest>, CliError> {
    if args.title.is_some() && args.sources.len() > 1 {
        return Err(CliError::Config(
            "--title can only be used with a single source".to_string(),
        ));
    }

    Ok(args
        .sources
        .iter()
        .map(|source| {
            let request = if Path::new(source).is_file() {
                InstallRequest::archive(source, args.units.clone())
            } else {
                InstallRequest::remote(source, args.units.clone())
            };
            match &args.title {
                Some(title) => request.with_title(title),
                None => request,
            }
        })
        .collect())
}

pub fn run(args: InstallArgs, mut session: Session) -> Result<(), CliError> {
    let requests = requests(&args)?;
    let manager = session
        .manager
        .clone()
        .with_keep_archives(session.manager.keep_archives || args.keep_archive);
    let cancel = cancel_on_interrupt();
    let bar = spinner("Preparing");
    let progress = bar.clone();

    let installer = LiveryInstaller::new(&manager, &session.catalog)
        .with_downloader(Box::new(HttpDownloader::new(manager.download_timeout)?))
        .with_metadata_provider(Box::new(DirectLinkProvider))
        .with_cancel_flag(cancel)
        .with_progress(Box::new(move |stage: InstallStage, message: &str| {
            progress.set_message(format!("{}: {}", stage.name(), message));
        }));

    let results = installer.install_many(&mut session.registry, &requests);
    bar.finish_and_clear();

    let total = requests.len();
    let mut failed = 0;
    let mut cancelled = false;
    for (label, result) in &results {
        match result {
            Ok(installed) => {
                let livery = &installed.livery;
                println!(
                    "{} {} ({}) for {} [{}]",
                    style("Installed").green().bold(),
                    livery.title(),
                    livery.id,
                    livery.target_units.join(", "),
                    format_size(livery.installed_size())
                );
            }
            Err(ManagerError::Cancelled) => cancelled = true,
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", style("Failed").red().bold(), label, e);
            }
        }
    }

    if cancelled {
        return Err(CliError::Cancelled);
    }
    if failed > 0 {
        return Err(CliError::Failed { failed, total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(sources: &[&str], title: Option<&str>) -> InstallArgs {
        InstallArgs {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            units: vec!["f-16c".to_string()],
            title: title.map(str::to_string),
            keep_archive: false,
        }
    }

    #[test]
    fn test_title_needs_single_source() {
        let result = requests(&args(&["a.zip", "b.zip"], Some("Pack")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_file_becomes_remote() {
        let requests = requests(&args(&["https://example.com/pack.zip"], None)).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].label(), "https://example.com/pack.zip");
    }
}
