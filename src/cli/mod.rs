//! CLI module for mayor - command-line interface and subcommands.
//!
//! Runs scheduling cycles against world snapshot files and inspects or
//! clears persisted assignments.

pub mod commands;

pub use commands::Cli;
