//! CLI module for ChatCast.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ChatCast - turn research papers into podcast conversations
///
/// Extracts the text of a PDF, summarizes it, rewrites the summary as a
/// dialogue between a host and an expert, and voices every line.
#[derive(Parser, Debug)]
#[command(name = "chatcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Convert a single PDF into podcast audio
    Convert {
        /// Path to the PDF document
        input: String,

        /// Output audio file (defaults to the input path with a .wav extension)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
