//! Request and response records for the `files` endpoints.
//!
//! Field names match the wire JSON exactly. Optional wire fields are
//! `Option`s so that "absent" and "zero" stay distinct.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::body::{ByteStream, UploadBody};

// ============================================================================
// Metadata
// ============================================================================

/// Kind of entry a [`Metadata`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Endpoints that can only return files (upload, restore, download) omit
    /// the tag.
    #[default]
    File,
    Folder,
    Deleted,
}

/// Metadata for a file, folder, or deleted entry.
///
/// `tag` decides which fields are meaningful: `size`, `rev`, the timestamps,
/// and `content_hash` are only set for files, and deleted entries carry no
/// `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Entry kind. Defaults to [`Tag::File`] when the service omits it.
    #[serde(rename = ".tag", default)]
    pub tag: Tag,
    /// Last path component, with the casing the user chose.
    pub name: String,
    /// Lowercased full path, usable as a case-insensitive key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    /// Full path with the casing the user chose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    /// Modification time set by the uploading client.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::serialize"
    )]
    pub client_modified: Option<DateTime<Utc>>,
    /// Modification time recorded by the service.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::serialize"
    )]
    pub server_modified: Option<DateTime<Utc>>,
    /// Revision of the file's current content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// File size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Stable identifier that survives moves and renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Service-defined hash of the file content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Metadata {
    pub fn is_file(&self) -> bool {
        self.tag == Tag::File
    }

    pub fn is_folder(&self) -> bool {
        self.tag == Tag::Folder
    }

    pub fn is_deleted(&self) -> bool {
        self.tag == Tag::Deleted
    }
}

/// Conflict behaviour for [`crate::Files::upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Fail (or auto-rename) if something already exists at the path.
    #[default]
    Add,
    /// Replace whatever exists at the path.
    Overwrite,
}

// ============================================================================
// Get Metadata
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetMetadataInput {
    /// Path or id of the entry.
    pub path: String,
    /// Include photo and video metadata for media files.
    pub include_media_info: bool,
}

impl GetMetadataInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMetadataOutput {
    /// The entry at the requested path.
    #[serde(flatten)]
    pub metadata: Metadata,
}

// ============================================================================
// Create Folder
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateFolderInput {
    /// Path of the folder to create.
    pub path: String,
}

impl CreateFolderInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFolderOutput {
    /// Name of the new folder.
    pub name: String,
    /// Lowercased full path of the new folder.
    pub path_lower: String,
    /// Identifier of the new folder.
    pub id: String,
}

// ============================================================================
// Delete
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteInput {
    /// Path of the file or folder to delete.
    pub path: String,
}

impl DeleteInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutput {
    /// The entry as it was before deletion.
    #[serde(flatten)]
    pub metadata: Metadata,
}

// ============================================================================
// Copy / Move
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyInput {
    /// Path of the entry to copy.
    pub from_path: String,
    /// Destination path. Nothing may exist there yet.
    pub to_path: String,
}

impl CopyInput {
    pub fn new(from_path: impl Into<String>, to_path: impl Into<String>) -> Self {
        Self {
            from_path: from_path.into(),
            to_path: to_path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOutput {
    /// The new copy.
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveInput {
    /// Path of the entry to move.
    pub from_path: String,
    /// Destination path. Nothing may exist there yet.
    pub to_path: String,
}

impl MoveInput {
    pub fn new(from_path: impl Into<String>, to_path: impl Into<String>) -> Self {
        Self {
            from_path: from_path.into(),
            to_path: to_path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutput {
    /// The entry at its new location.
    #[serde(flatten)]
    pub metadata: Metadata,
}

// ============================================================================
// Restore
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreInput {
    /// Path of the file to restore.
    pub path: String,
    /// Revision to restore the file to.
    pub rev: String,
}

impl RestoreInput {
    pub fn new(path: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rev: rev.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOutput {
    /// The file at the restored revision.
    #[serde(flatten)]
    pub metadata: Metadata,
}

// ============================================================================
// List Folder
// ============================================================================

/// An empty `path` lists the root folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListFolderInput {
    /// Folder to list.
    pub path: String,
    /// Include the contents of every subfolder.
    pub recursive: bool,
    /// Include photo and video metadata for media files.
    pub include_media_info: bool,
    /// Include entries for deleted files and folders.
    pub include_deleted: bool,
}

impl ListFolderInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListFolderContinueInput {
    /// Cursor from the previous page.
    pub cursor: String,
}

impl ListFolderContinueInput {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
        }
    }
}

/// One page of a folder listing.
///
/// While `has_more` is set, pass `cursor` to
/// [`crate::Files::list_folder_continue`] for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFolderOutput {
    /// Position after this page.
    pub cursor: String,
    /// Whether more entries follow this page.
    pub has_more: bool,
    /// Entries on this page.
    #[serde(default)]
    pub entries: Vec<Metadata>,
}

// ============================================================================
// Search
// ============================================================================

/// What a search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// File and folder names.
    #[default]
    Filename,
    /// Names and file content.
    FilenameAndContent,
    /// Names of deleted files and folders.
    DeletedFilename,
}

/// Why a search result matched. On the wire: `{".tag": "filename"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum SearchMatchType {
    Filename,
    Content,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Which part of the entry matched.
    pub match_type: SearchMatchType,
    /// The matching entry.
    pub metadata: Metadata,
}

/// Search request.
///
/// `mode` is left as given at construction; [`crate::Files::search`] fills
/// in [`SearchMode::Filename`] when it is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchInput {
    /// Folder to search in. Empty for the root.
    pub path: String,
    /// Text to look for.
    pub query: String,
    /// Index of the first result to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    /// Maximum number of results to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u64>,
    /// What to match against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchMode>,
}

impl SearchInput {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutput {
    /// Matches on this page.
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
    /// Whether more matches follow.
    pub more: bool,
    /// Offset to pass as `start` for the next page.
    pub start: u64,
}

// ============================================================================
// Upload
// ============================================================================

/// Upload request. The input fields travel in the `Dropbox-API-Arg` header
/// and `body` is streamed as the request body.
#[derive(Debug, Default, Serialize)]
pub struct UploadInput {
    /// Destination path.
    pub path: String,
    /// What to do when something already exists at `path`.
    pub mode: WriteMode,
    /// On conflict, pick a free name instead of failing.
    pub autorename: bool,
    /// Don't notify the user's devices about the change.
    pub mute: bool,
    /// Modification time to record for the file.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::serialize"
    )]
    pub client_modified: Option<DateTime<Utc>>,
    /// File content.
    #[serde(skip)]
    pub body: UploadBody,
}

impl UploadInput {
    pub fn new(path: impl Into<String>, body: impl Into<UploadBody>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutput {
    /// The uploaded file.
    #[serde(flatten)]
    pub metadata: Metadata,
}

// ============================================================================
// Download
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadInput {
    /// Path or id of the file.
    pub path: String,
}

impl DownloadInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A download in progress. The caller owns `body`; dropping it closes the
/// connection.
#[derive(Debug)]
pub struct DownloadOutput {
    /// Metadata from the `Dropbox-API-Result` response header.
    pub metadata: Option<Metadata>,
    /// File content.
    pub body: ByteStream,
}

/// The service accepts timestamps only as whole-second UTC, e.g.
/// `2015-05-12T15:50:38Z`.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    #[expect(
        clippy::ref_option,
        reason = "serde's serialize_with passes a reference to the field"
    )]
    pub(super) fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }
}
