//! Client for the Dropbox files API.
//!
//! [`Files`] covers the `files` namespace:
//! - Metadata lookup, folder creation, delete, copy, move and restore
//! - Folder listing, with cursor continuation
//! - Search
//! - Streaming upload and download
//!
//! ```no_run
//! use dropbox::{Config, Files, ListFolderInput};
//!
//! # async fn run() -> dropbox::Result<()> {
//! let files = Files::new(Config::from_env()?)?;
//! for entry in files.list_folder_entries(&ListFolderInput::new("")).await? {
//!     println!("{}", entry.name);
//! }
//! # Ok(())
//! # }
//! ```

mod body;
mod client;
mod config;
mod error;
pub mod files;

pub use body::{ByteStream, UploadBody};
pub use client::{API_ARG_HEADER, API_RESULT_HEADER, Client};
pub use config::{
    ACCESS_TOKEN_ENV, API_BASE_URL_ENV, CONTENT_BASE_URL_ENV, Config, ConfigError,
    DEFAULT_API_BASE_URL, DEFAULT_CONTENT_BASE_URL,
};
pub use error::{ApiError, Error, Result};
pub use files::*;
