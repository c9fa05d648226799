//! Command-line arguments for the `proclife` binary

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "proclife",
    version,
    about = "Launch, signal and inspect managed processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level; falls back to `PROCLIFE_LOG`, then `info`
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Print the first non-loopback IPv4 address of a network interface
    InterfaceIp {
        #[arg(long, value_name = "NAME")]
        interface: String,
    },

    /// Run a binary until it exits; Ctrl-C stops it, a second Ctrl-C kills it
    Run {
        /// Raise the scheduling priority of the process once it is running
        #[arg(long)]
        renice: bool,

        /// Niceness increment used with --renice
        #[arg(long, value_name = "N", default_value_t = -10, allow_hyphen_values = true)]
        priority: i32,

        /// Append combined stdout/stderr to this file instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Let the process outlive this one
        #[arg(long)]
        no_parent_death_signal: bool,

        binary: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
