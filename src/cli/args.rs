//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Bill-of-materials part trees: quantity queries, aliasing copies and deep clones
#[derive(Parser, Debug)]
#[command(name = "bomtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory (default: cwd); relative -f/-q paths resolve against it
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer queries, list parts and verify deep copy
    Run {
        #[command(flatten)]
        input: InputArgs,
        /// Query file (default: queries.txt)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        queries: Option<PathBuf>,
    },

    /// Answer all queries of a query file
    Query {
        #[command(flatten)]
        input: InputArgs,
        /// Query file (default: queries.txt)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        queries: Option<PathBuf>,
    },

    /// List the direct sub-parts of a part
    Whatis {
        /// Part name
        name: String,
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show how many units of a sub-part a part contains
    Howmany {
        /// Parent part
        parent: String,
        /// Sub-part
        child: String,
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print every part with its quantity (pre-order)
    Report {
        #[command(flatten)]
        input: InputArgs,
        /// Print the sub-part listing of every part instead
        #[arg(short, long)]
        listing: bool,
    },

    /// Show hierarchy as tree
    Tree {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Check that a deep clone shares no nodes and matches the source
    Verify {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Definition file selection shared by all tree commands.
#[derive(clap::Args, Debug, Default)]
pub struct InputArgs {
    /// Definition file (default: definitions.txt)
    #[arg(short = 'f', long, value_hint = ValueHint::FilePath)]
    pub definitions: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
