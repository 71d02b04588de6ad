//! `mode` command: show or switch mod-manager mode.
//!
//! In mod-manager mode new liveries are installed into a self-contained
//! `DCSLM/<title>/Liveries` tree instead of the shared `Liveries` folder.
//! Existing installs are not moved.

use clap::{Args, ValueEnum};

use super::common::Session;
use crate::error::CliError;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct ModeArgs {
    /// New mod-manager mode; prints the current mode when omitted
    pub mode: Option<Switch>,
}

pub fn run(args: ModeArgs, mut session: Session) -> Result<(), CliError> {
    if let Some(mode) = args.mode {
        session
            .registry
            .set_mod_manager_mode(matches!(mode, Switch::On));
        session.registry.save()?;
    }

    let state = if session.registry.mod_manager_mode() {
        "on"
    } else {
        "off"
    };
    println!("Mod-manager mode: {}", state);
    Ok(())
}
