//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

/// Terminal chat client for an enterprise chat-completion gateway.
#[derive(Parser, Debug)]
#[command(name = "kaiwa", version, about)]
pub struct Cli {
    /// Prompt to send one-shot; starts an interactive session when omitted
    pub prompt: Vec<String>,

    /// Model to use (must be one of the configured models)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Wait for the complete response instead of streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Read configuration from PATH instead of ~/.kaiwa/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
