use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[clap(
    name = "pstree-assert",
    about = "Checks that the processes running in a container form the expected tree",
    version
)]
pub struct Cli {
    /// Config file (TOML). Defaults to ./pstree.toml when present
    #[clap(long, global = true)]
    pub config: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Match a running container's process tree against a pattern file
    Check {
        /// Container name or id
        #[clap(long)]
        container: String,

        /// Pattern file (.toml or .json)
        #[clap(long)]
        pattern: PathBuf,

        /// Number of processes to wait for. Defaults to the number of processes in the pattern
        #[clap(long)]
        expect_count: Option<usize>,
    },

    /// Match a saved `ps ax -o pid,ppid,ruser,args` listing against a pattern file
    Match {
        /// File containing the ps output, header line included
        #[clap(long)]
        listing: PathBuf,

        /// Pattern file (.toml or .json)
        #[clap(long)]
        pattern: PathBuf,
    },

    /// Print the process tree of a running container
    Show {
        /// Container name or id
        #[clap(long)]
        container: String,

        /// Print the tree as a TOML pattern file instead
        #[clap(long)]
        as_pattern: bool,

        /// Include pids when printing a pattern
        #[clap(long, requires = "as_pattern")]
        with_pids: bool,
    },

    /// Check that a pattern file is valid
    Validate {
        #[clap(long)]
        pattern: PathBuf,
    },

    /// Print the effective configuration as JSON
    Config,
}
