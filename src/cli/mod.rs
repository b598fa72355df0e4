//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Amnesia using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Amnesia - GDPR data subject request toolkit
#[derive(Parser, Debug)]
#[command(name = "amnesia")]
#[command(version, about, long_about = None)]
#[command(author = "Amnesia Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "amnesia.toml", env = "AMNESIA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "AMNESIA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a Right to Access request and produce an export archive
    Access(commands::access::AccessArgs),

    /// Process a Right to be Forgotten request
    Erase(commands::erase::EraseArgs),

    /// Produce a sanitized SQL dump
    Dump(commands::dump::DumpArgs),

    /// List fields and their configured dispositions
    Fields(commands::fields::FieldsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
