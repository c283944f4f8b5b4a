//! `dbx upload` and `dbx download` command implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use dropbox::{
    ByteStream, DownloadInput, DownloadOutput, Files, UPLOAD_SIZE_LIMIT, UploadInput, WriteMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::print_json;

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local file to upload.
    pub local: PathBuf,

    /// Remote destination path.
    pub remote: String,

    /// Replace an existing file instead of failing.
    #[arg(long)]
    pub overwrite: bool,

    /// Pick a free name when the destination already exists.
    #[arg(long)]
    pub autorename: bool,

    /// Don't notify the user's desktop clients about the change.
    #[arg(long)]
    pub mute: bool,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Remote file to download.
    pub remote: String,

    /// Where to write the file. Writes to stdout when omitted.
    pub local: Option<PathBuf>,
}

pub async fn upload(files: &Files, args: &UploadArgs) -> Result<()> {
    let file = tokio::fs::File::open(&args.local)
        .await
        .with_context(|| format!("failed to open {}", args.local.display()))?;
    let local_meta = file
        .metadata()
        .await
        .with_context(|| format!("failed to stat {}", args.local.display()))?;

    if local_meta.len() > UPLOAD_SIZE_LIMIT {
        anyhow::bail!(
            "{} is {} bytes; single uploads are limited to {UPLOAD_SIZE_LIMIT} bytes",
            args.local.display(),
            local_meta.len()
        );
    }

    let input = UploadInput {
        mode: if args.overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::Add
        },
        autorename: args.autorename,
        mute: args.mute,
        client_modified: local_meta.modified().ok().map(DateTime::<Utc>::from),
        ..UploadInput::new(&args.remote, file)
    };

    let output = files
        .upload(input)
        .await
        .with_context(|| format!("failed to upload {}", args.local.display()))?;

    eprintln!(
        "{} Uploaded {} -> {}",
        style("✓").green().bold(),
        args.local.display(),
        style(
            output
                .metadata
                .path_display
                .as_deref()
                .unwrap_or(&args.remote)
        )
        .bold()
    );
    print_json(&output)
}

pub async fn download(files: &Files, args: &DownloadArgs) -> Result<()> {
    let DownloadOutput { metadata, mut body } = files
        .download(&DownloadInput::new(&args.remote))
        .await
        .with_context(|| format!("failed to download {}", args.remote))?;

    let Some(local) = &args.local else {
        let mut stdout = tokio::io::stdout();
        copy_body(&mut body, &mut stdout, None).await?;
        return Ok(());
    };

    let mut file = tokio::fs::File::create(local)
        .await
        .with_context(|| format!("failed to create {}", local.display()))?;

    let total = metadata
        .as_ref()
        .and_then(|m| m.size)
        .or_else(|| body.content_length());
    let pb = progress_bar(total);
    let written = copy_body(&mut body, &mut file, Some(&pb)).await?;
    pb.finish_and_clear();

    debug!(remote = %args.remote, bytes = written, "download complete");
    eprintln!(
        "{} Downloaded {} -> {} ({written} bytes)",
        style("✓").green().bold(),
        style(&args.remote).bold(),
        local.display()
    );
    if let Some(metadata) = &metadata {
        print_json(metadata)?;
    }
    Ok(())
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                    .expect("invalid template")
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {bytes} ({bytes_per_sec})")
                    .expect("invalid template"),
            );
            pb
        }
    }
}

/// Copies the download body into `writer` chunk by chunk, returning the number
/// of bytes written.
async fn copy_body<W>(
    body: &mut ByteStream,
    writer: &mut W,
    progress: Option<&ProgressBar>,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0_u64;
    while let Some(chunk) = body.chunk().await.context("failed to read download")? {
        writer
            .write_all(&chunk)
            .await
            .context("failed to write download")?;

        let len = u64::try_from(chunk.len())?;
        written += len;
        if let Some(pb) = progress {
            pb.inc(len);
        }
    }
    writer.flush().await.context("failed to write download")?;
    Ok(written)
}
