//! CLI module for llm-cache
//!
//! Provides subcommands for driving the cache by hand:
//! - `session`: read cache commands from stdin against one in-process cache
//! - `config`: print the effective configuration

pub mod config;
pub mod session;

use clap::{Parser, Subcommand};

/// llm-cache - Semantic result cache for LLM completions
#[derive(Parser)]
#[command(name = "llm-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an interactive cache session on stdin
    Session(session::SessionArgs),

    /// Print the effective configuration as JSON
    Config,
}
