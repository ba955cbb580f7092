pub mod commands;
pub mod config;
pub mod remote;
pub mod schedule;
pub mod slurm;
pub mod template;
pub mod testutils;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),

    #[error("Day `{0}` not recognized (use Mon, Tue, Wed, Thu, Fri, Sat or Sun)")]
    InvalidDay(String),

    #[error("Start time `{0}` not recognized (use e.g. 12pm or 10:30am)")]
    InvalidStartTime(String),

    #[error("Hours `{0}` not recognized (use e.g. 4h)")]
    InvalidHours(String),

    #[error("Cpus `{0}` not recognized (use e.g. 1)")]
    InvalidCpus(String),

    #[error("Mem_gb `{0}` not recognized (use e.g. 8gb)")]
    InvalidMemGb(String),

    #[error("Schedule contains no entries")]
    NoScheduledEntries,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported config version")]
    UnsupportedConfigVersionError,

    #[error("No config file found (tried ./nbsched.toml and nbsched/nbsched.toml in the user config directory)")]
    ConfigNotFoundError,

    #[error("Command failed: {0}")]
    CommandFailed(String),
}
