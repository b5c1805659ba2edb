//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// link-saver - keep a copy of a page and share it through a short-lived link
#[derive(Parser)]
#[command(name = "link-saver")]
#[command(version)]
#[command(about = "Capture web pages and serve them back through expiring links", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Capture a page and store it for a user
    Save {
        /// External user id
        user_id: i64,

        /// Page to capture (http or https)
        url: String,

        /// Free-form description
        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },

    /// List a user's saved links, newest first
    List {
        /// External user id
        user_id: i64,

        /// Only show links whose description contains this text
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Remove a saved link
    Remove {
        /// Link id
        link_id: i64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,
    },
}
