//! `dbx search` command implementation.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use dropbox::{Files, SearchInput, SearchMode};

use super::print_json;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to search for.
    pub query: String,

    /// Folder to search in. Defaults to the root.
    #[arg(long, default_value = "")]
    pub path: String,

    /// What to match against. The service searches file names when unset.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Index of the first result to return.
    #[arg(long)]
    pub start: Option<u64>,

    /// Maximum number of results to return.
    #[arg(long)]
    pub max_results: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Filename,
    FilenameAndContent,
    DeletedFilename,
}

impl From<Mode> for SearchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Filename => Self::Filename,
            Mode::FilenameAndContent => Self::FilenameAndContent,
            Mode::DeletedFilename => Self::DeletedFilename,
        }
    }
}

impl SearchArgs {
    fn to_input(&self) -> SearchInput {
        SearchInput {
            start: self.start,
            max_results: self.max_results,
            mode: self.mode.map(SearchMode::from),
            ..SearchInput::new(&self.path, &self.query)
        }
    }
}

pub async fn run(files: &Files, args: &SearchArgs) -> Result<()> {
    let mut input = args.to_input();
    let output = files
        .search(&mut input)
        .await
        .with_context(|| format!("search for {:?} failed", args.query))?;

    print_json(&output)
}
