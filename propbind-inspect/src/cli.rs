//! Command-line interface definitions for `propbind-inspect`.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Parsed CLI arguments for `propbind-inspect`.
#[derive(Debug, Parser)]
#[command(name = "propbind-inspect")]
#[command(about = "Show resolved configuration properties and their origins")]
#[command(version)]
pub struct Args {
    /// Configuration file to load (repeat to layer; later files win).
    #[arg(long = "file", value_name = "path", global = true)]
    pub files: Vec<PathBuf>,
    /// Only read environment variables starting with this prefix.
    #[arg(long, value_name = "prefix", global = true)]
    pub env_prefix: Option<String>,
    /// Do not read the process environment.
    #[arg(long = "no-env", global = true)]
    pub should_skip_env: bool,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// What to show.
    #[command(subcommand)]
    pub command: Command,
}

/// Inspection commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one property with its full origin chain.
    Get {
        /// Property name, for example `server.port`.
        name: String,
        /// Command-line properties.
        #[command(flatten)]
        overrides: Overrides,
    },
    /// List every discoverable property under a prefix.
    List {
        /// Prefix to list below; everything when omitted.
        prefix: Option<String>,
        /// Command-line properties.
        #[command(flatten)]
        overrides: Overrides,
    },
}

impl Command {
    /// The command-line properties passed after `--`.
    #[must_use]
    pub fn overrides(&self) -> &[String] {
        match self {
            Self::Get { overrides, .. } | Self::List { overrides, .. } => &overrides.args,
        }
    }
}

/// Arguments after a bare `--`, such as `--server.port=9000`.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct Overrides {
    /// `--key=value` pairs with the highest precedence.
    #[arg(last = true, value_name = "--key=value")]
    pub args: Vec<String>,
}
