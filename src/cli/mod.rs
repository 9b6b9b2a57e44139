//! CLI module - Command-line interface for byceps-authn
//!
//! Operational tooling around the authentication store: session
//! invalidation, login forensics, retention and identity tag lookup.

mod commands;

use clap::{Parser, Subcommand};

/// byceps-authn - Authentication core
/// Credentials, sessions, identity tags and the user log
#[derive(Parser)]
#[command(name = "byceps-authn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage session tokens
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Inspect and prune login log entries
    Logins {
        #[command(subcommand)]
        command: LoginCommands,
    },

    /// Inspect identity tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Invalidate the sessions of all users
    Purge,
}

#[derive(Subcommand)]
pub enum LoginCommands {
    /// List logins from an IP address
    #[command(alias = "ip")]
    ByIp {
        /// IP address as recorded at login
        ip_address: String,
    },
    /// Delete login entries older than the retention window
    Prune {
        /// Override the configured retention in days
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// List all identity tags
    #[command(alias = "ls")]
    List,
    /// Find the tag for an identifier (case-insensitive)
    Lookup {
        /// Identifier as read from the physical token
        identifier: String,
    },
}

pub use commands::*;
