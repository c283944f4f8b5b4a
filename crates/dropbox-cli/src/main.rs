//! Command-line client for Dropbox file storage.
//!
//! Usage:
//! ```bash
//! dbx metadata /Docs/report.pdf       # Show metadata for a path
//! dbx mkdir /Docs/Archive             # Create a folder
//! dbx rm /Docs/old.txt                # Delete a file or folder
//! dbx cp /a.txt /b.txt                # Copy
//! dbx mv /a.txt /Archive/a.txt        # Move or rename
//! dbx restore /a.txt a1c10ce0dd78     # Restore a revision
//! dbx ls /Docs --recursive            # List a folder
//! dbx search budget --path /Finance   # Search
//! dbx upload ./report.pdf /report.pdf # Upload a local file
//! dbx download /report.pdf ./out.pdf  # Download (stdout if no local path)
//! ```
//!
//! The access token is read from `DROPBOX_ACCESS_TOKEN`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dropbox::{Config, Files};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "dbx", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show metadata for a file or folder
    Metadata(commands::entry::MetadataArgs),

    /// Create a folder
    Mkdir(commands::entry::PathArgs),

    /// Delete a file or folder
    Rm(commands::entry::PathArgs),

    /// Copy a file or folder
    Cp(commands::entry::RelocateArgs),

    /// Move or rename a file or folder
    Mv(commands::entry::RelocateArgs),

    /// Restore a file to an earlier revision
    Restore(commands::entry::RestoreArgs),

    /// List the contents of a folder
    Ls(commands::list::LsArgs),

    /// Search for files and folders
    Search(commands::search::SearchArgs),

    /// Upload a local file
    Upload(commands::transfer::UploadArgs),

    /// Download a file
    Download(commands::transfer::DownloadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load Dropbox configuration")?;
    let files = Files::new(config).context("failed to create Dropbox client")?;

    match &cli.command {
        Command::Metadata(args) => commands::entry::metadata(&files, args).await,
        Command::Mkdir(args) => commands::entry::mkdir(&files, args).await,
        Command::Rm(args) => commands::entry::remove(&files, args).await,
        Command::Cp(args) => commands::entry::copy(&files, args).await,
        Command::Mv(args) => commands::entry::move_entry(&files, args).await,
        Command::Restore(args) => commands::entry::restore(&files, args).await,
        Command::Ls(args) => commands::list::run(&files, args).await,
        Command::Search(args) => commands::search::run(&files, args).await,
        Command::Upload(args) => commands::transfer::upload(&files, args).await,
        Command::Download(args) => commands::transfer::download(&files, args).await,
    }
}
