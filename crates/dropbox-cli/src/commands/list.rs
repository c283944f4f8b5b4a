//! `dbx ls` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use dropbox::{Files, ListFolderInput};
use tracing::debug;

use super::print_json;

#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder to list. Defaults to the root.
    #[arg(default_value = "")]
    pub path: String,

    /// Include the contents of every subfolder.
    #[arg(short, long)]
    pub recursive: bool,

    /// Include deleted entries.
    #[arg(long)]
    pub deleted: bool,

    /// Include photo and video metadata.
    #[arg(long)]
    pub media_info: bool,
}

impl LsArgs {
    fn to_input(&self) -> ListFolderInput {
        ListFolderInput {
            recursive: self.recursive,
            include_media_info: self.media_info,
            include_deleted: self.deleted,
            ..ListFolderInput::new(&self.path)
        }
    }
}

pub async fn run(files: &Files, args: &LsArgs) -> Result<()> {
    let entries = files
        .list_folder_entries(&args.to_input())
        .await
        .with_context(|| format!("failed to list {}", display_path(&args.path)))?;

    debug!(path = %args.path, entries = entries.len(), "listing complete");
    print_json(&entries)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}
