//! Commands acting on a single entry: `metadata`, `mkdir`, `rm`, `cp`, `mv`
//! and `restore`.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use dropbox::{
    CopyInput, CreateFolderInput, DeleteInput, Files, GetMetadataInput, MoveInput, RestoreInput,
};

use super::print_json;

#[derive(Debug, Args)]
pub struct MetadataArgs {
    /// Remote path (e.g. "/Docs/report.pdf") or id.
    pub path: String,

    /// Include photo and video metadata.
    #[arg(long)]
    pub media_info: bool,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Remote path.
    pub path: String,
}

#[derive(Debug, Args)]
pub struct RelocateArgs {
    /// Source path.
    pub from: String,

    /// Destination path.
    pub to: String,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Remote path of the file.
    pub path: String,

    /// Revision to restore.
    pub rev: String,
}

pub async fn metadata(files: &Files, args: &MetadataArgs) -> Result<()> {
    let input = GetMetadataInput {
        include_media_info: args.media_info,
        ..GetMetadataInput::new(&args.path)
    };
    let output = files
        .get_metadata(&input)
        .await
        .with_context(|| format!("failed to get metadata for {}", args.path))?;

    print_json(&output)
}

pub async fn mkdir(files: &Files, args: &PathArgs) -> Result<()> {
    let output = files
        .create_folder(&CreateFolderInput::new(&args.path))
        .await
        .with_context(|| format!("failed to create folder {}", args.path))?;

    eprintln!(
        "{} Created {}",
        style("✓").green().bold(),
        style(&output.path_lower).bold()
    );
    print_json(&output)
}

pub async fn remove(files: &Files, args: &PathArgs) -> Result<()> {
    let output = files
        .delete(&DeleteInput::new(&args.path))
        .await
        .with_context(|| format!("failed to delete {}", args.path))?;

    eprintln!(
        "{} Deleted {}",
        style("✓").green().bold(),
        style(&args.path).bold()
    );
    print_json(&output)
}

pub async fn copy(files: &Files, args: &RelocateArgs) -> Result<()> {
    let output = files
        .copy(&CopyInput::new(&args.from, &args.to))
        .await
        .with_context(|| format!("failed to copy {} to {}", args.from, args.to))?;

    print_json(&output)
}

pub async fn move_entry(files: &Files, args: &RelocateArgs) -> Result<()> {
    let output = files
        .move_entry(&MoveInput::new(&args.from, &args.to))
        .await
        .with_context(|| format!("failed to move {} to {}", args.from, args.to))?;

    print_json(&output)
}

pub async fn restore(files: &Files, args: &RestoreArgs) -> Result<()> {
    let output = files
        .restore(&RestoreInput::new(&args.path, &args.rev))
        .await
        .with_context(|| format!("failed to restore {} to revision {}", args.path, args.rev))?;

    print_json(&output)
}
