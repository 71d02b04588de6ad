//! CLI command implementations.

pub mod common;
pub mod config;
pub mod install;
pub mod list;
pub mod mode;
pub mod optimize;
pub mod scan;
pub mod uninstall;
pub mod units;
