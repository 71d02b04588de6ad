//! DCS Livery Manager.
//!
//! Installs downloaded or local livery archives into the game's saved-games
//! folder, keeps a persistent registry of what was installed where, and
//! deduplicates textures across the variants of a skin pack.
//!
//! # Modules
//!
//! - [`manager`]: archive download, extraction, detection and installation
//! - [`registry`]: the persistent index of installed liveries
//! - [`optimizer`]: texture deduplication and unused-file pruning
//! - [`parser`]: `description.lua` statement parsing
//! - [`units`]: unit catalog and folder resolution
//! - [`livery`]: livery records
//! - [`config`]: user configuration file
//! - [`logging`]: tracing setup

pub mod config;
pub mod livery;
pub mod logging;
pub mod manager;
pub mod optimizer;
pub mod parser;
pub mod registry;
pub mod safety;
pub mod units;
