//! Command-line interface for garagelog.
//!
//! This module provides the CLI structure and argument parsing for the
//! `garagelog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    parse_fields, AddCommand, ConfigCommand, ExportCommand, ImportCommand, ListCommand, RecordArg,
    StatusCommand, UpdateCommand,
};

/// garagelog - vehicle trip and maintenance logbook
///
/// Records trips, expense notes, and maintenance entries in a local store,
/// and backs the whole store up to a portable ZIP archive that can be
/// restored on any device.
#[derive(Debug, Parser)]
#[command(name = "garagelog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show store location and record counts
    Status(StatusCommand),

    /// Append an entry to a log record
    Add(AddCommand),

    /// List the entries of a log record
    List(ListCommand),

    /// Patch fields of an existing entry
    Update(UpdateCommand),

    /// View or modify the vehicle configuration record
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Export the whole store to a ZIP backup archive
    Export(ExportCommand),

    /// Restore the store from a ZIP backup archive
    Import(ImportCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
