//! CLI command implementations.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod entry;
pub mod list;
pub mod search;
pub mod transfer;

/// Prints an operation's output as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to format output")?;
    println!("{json}");
    Ok(())
}
