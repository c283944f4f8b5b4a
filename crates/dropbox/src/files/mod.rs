//! The `files` namespace: metadata, folder management, listing, search,
//! upload and download.

mod types;

pub use types::*;
use tracing::warn;

use crate::{
    body::{ByteStream, UploadBody},
    client::{API_RESULT_HEADER, Client, decode_json},
    config::Config,
    error::{Error, Result},
};

/// Largest body a single upload request accepts, in bytes.
pub const UPLOAD_SIZE_LIMIT: u64 = 150 * 1024 * 1024;

/// Client for files and folders.
///
/// Every method is a single request. Nothing is cached or retried, and
/// `Files` holds no per-call state, so one instance can be cloned into and
/// shared between tasks freely.
#[derive(Debug, Clone)]
pub struct Files {
    client: Client,
}

impl Files {
    /// Creates a files client with its own connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_client(Client::new(config)?))
    }

    /// Creates a files client on top of an existing connection.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the metadata for a file or folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the path does not exist, or
    /// the response cannot be decoded.
    pub async fn get_metadata(&self, input: &GetMetadataInput) -> Result<GetMetadataOutput> {
        self.client.call_json("/files/get_metadata", input).await
    }

    /// Creates a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if something already exists at the path, the path is
    /// invalid, or the request fails.
    pub async fn create_folder(&self, input: &CreateFolderInput) -> Result<CreateFolderOutput> {
        self.client.call_json("/files/create_folder", input).await
    }

    /// Deletes a file, or a folder and its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing exists at the path or the request fails.
    pub async fn delete(&self, input: &DeleteInput) -> Result<DeleteOutput> {
        self.client.call_json("/files/delete", input).await
    }

    /// Copies a file or folder to a different location.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, the destination exists, or
    /// the request fails.
    pub async fn copy(&self, input: &CopyInput) -> Result<CopyOutput> {
        self.client.call_json("/files/copy", input).await
    }

    /// Moves a file or folder to a different location.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing, the destination exists, or
    /// the request fails.
    pub async fn move_entry(&self, input: &MoveInput) -> Result<MoveOutput> {
        self.client.call_json("/files/move", input).await
    }

    /// Restores a file to a specific revision.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision is unknown or the request fails.
    pub async fn restore(&self, input: &RestoreInput) -> Result<RestoreOutput> {
        self.client.call_json("/files/restore", input).await
    }

    /// Lists the first page of a folder's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a folder or the request fails.
    pub async fn list_folder(&self, input: &ListFolderInput) -> Result<ListFolderOutput> {
        self.client.call_json("/files/list_folder", input).await
    }

    /// Fetches the next page of a listing started with
    /// [`list_folder`](Self::list_folder).
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is invalid or has been reset, or the
    /// request fails.
    pub async fn list_folder_continue(
        &self,
        input: &ListFolderContinueInput,
    ) -> Result<ListFolderOutput> {
        self.client
            .call_json("/files/list_folder/continue", input)
            .await
    }

    /// Lists a folder, following the cursor until every page is read.
    ///
    /// # Errors
    ///
    /// Returns the first error any page request hits, and
    /// [`Error::MissingCursor`] if a page reports more entries without a
    /// cursor. Entries from earlier pages are discarded either way.
    pub async fn list_folder_entries(&self, input: &ListFolderInput) -> Result<Vec<Metadata>> {
        let mut endpoint = "/files/list_folder";
        let mut page = self.list_folder(input).await?;
        let mut entries = std::mem::take(&mut page.entries);

        while page.has_more {
            if page.cursor.is_empty() {
                warn!(
                    %endpoint,
                    path = %input.path,
                    "listing reported more entries without a cursor"
                );
                return Err(Error::MissingCursor {
                    endpoint: endpoint.to_string(),
                });
            }
            endpoint = "/files/list_folder/continue";
            page = self
                .list_folder_continue(&ListFolderContinueInput::new(page.cursor))
                .await?;
            entries.append(&mut page.entries);
        }

        Ok(entries)
    }

    /// Searches for files and folders.
    ///
    /// When `input.mode` is `None` it is set to [`SearchMode::Filename`]
    /// before the request is sent, and stays set after the call returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    pub async fn search(&self, input: &mut SearchInput) -> Result<SearchOutput> {
        if input.mode.is_none() {
            input.mode = Some(SearchMode::Filename);
        }

        self.client.call_json("/files/search", input).await
    }

    /// Uploads a file of at most [`UPLOAD_SIZE_LIMIT`] bytes.
    ///
    /// The body is streamed, not buffered. Bodies of known length over the
    /// limit are rejected before anything is sent; streams of unknown length
    /// are left for the service to reject.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The body is known to exceed [`UPLOAD_SIZE_LIMIT`]
    /// - Something exists at the path and `mode` is [`WriteMode::Add`]
    ///   without `autorename`
    /// - Reading the body fails, or the request fails
    /// - The response cannot be decoded
    pub async fn upload(&self, mut input: UploadInput) -> Result<UploadOutput> {
        let body = std::mem::take(&mut input.body);
        ensure_upload_size(&body, UPLOAD_SIZE_LIMIT)?;

        let response = self
            .client
            .call_content("/files/upload", &input, Some(body))
            .await?;
        decode_json("/files/upload", response).await
    }

    /// Starts downloading a file.
    ///
    /// Returns as soon as the response headers arrive; the content is read
    /// from [`DownloadOutput::body`].
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or is a folder, the request
    /// fails, or the `Dropbox-API-Result` header is malformed.
    pub async fn download(&self, input: &DownloadInput) -> Result<DownloadOutput> {
        let response = self
            .client
            .call_content("/files/download", input, None)
            .await?;

        let metadata = response
            .headers()
            .get(API_RESULT_HEADER)
            .map(|value| serde_json::from_slice::<Metadata>(value.as_bytes()))
            .transpose()
            .map_err(|e| Error::decode("/files/download", e))?;

        Ok(DownloadOutput {
            metadata,
            body: ByteStream::new(response),
        })
    }
}

fn ensure_upload_size(body: &UploadBody, limit: u64) -> Result<()> {
    match body.len() {
        Some(size) if size > limit => Err(Error::UploadTooLarge { size, limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, Request, ResponseTemplate,
        matchers::{body_json, body_string, header, method, path},
    };

    use super::*;

    fn files_for(server: &MockServer) -> Files {
        let config = Config::new("test-token")
            .with_api_base_url(&server.uri())
            .unwrap()
            .with_content_base_url(&server.uri())
            .unwrap();
        Files::new(config).unwrap()
    }

    fn json_response(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    fn conflict(summary: &str) -> ResponseTemplate {
        ResponseTemplate::new(409).set_body_json(json!({
            "error_summary": summary,
            "error": {".tag": "path"}
        }))
    }

    /// Matches requests whose `Dropbox-API-Arg` header decodes to `expected`.
    fn api_arg(expected: serde_json::Value) -> impl Fn(&Request) -> bool + Send + Sync {
        move |req: &Request| {
            req.headers
                .get("dropbox-api-arg")
                .and_then(|v| serde_json::from_slice::<serde_json::Value>(v.as_bytes()).ok())
                .is_some_and(|arg| arg == expected)
        }
    }

    fn file_metadata(name: &str, size: u64) -> serde_json::Value {
        json!({
            "name": name,
            "path_lower": format!("/{name}"),
            "path_display": format!("/{name}"),
            "id": "id:a4ayc_80_OEAAAAAAAAAXw",
            "client_modified": "2024-01-15T10:00:00Z",
            "server_modified": "2024-01-15T10:00:01Z",
            "rev": "a1c10ce0dd78",
            "size": size,
            "content_hash": "e3b0c44298fc1c149afbf4c8996fb924"
        })
    }

    // --- Metadata ---

    #[tokio::test]
    async fn test_get_metadata_returns_tagged_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/get_metadata"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({"path": "/Homework/math", "include_media_info": false})))
            .respond_with(json_response(json!({
                ".tag": "folder",
                "name": "math",
                "id": "id:a4ayc_80_OEAAAAAAAAAXz",
                "path_lower": "/homework/math",
                "path_display": "/Homework/math"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .get_metadata(&GetMetadataInput::new("/Homework/math"))
            .await
            .unwrap();

        assert_eq!(output.metadata.tag, Tag::Folder);
        assert_eq!(output.metadata.name, "math");
        assert_eq!(output.metadata.size, None);
    }

    #[tokio::test]
    async fn test_get_metadata_not_found_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/get_metadata"))
            .respond_with(conflict("path/not_found/.."))
            .mount(&server)
            .await;

        let err = files_for(&server)
            .get_metadata(&GetMetadataInput::new("/missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(_)));
        assert!(err.api_summary().unwrap().starts_with("path/not_found"));
    }

    // --- Create / delete / copy / move / restore ---

    #[tokio::test]
    async fn test_create_folder_returns_folder_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/create_folder"))
            .and(body_json(json!({"path": "/Reports"})))
            .respond_with(json_response(json!({
                "name": "Reports",
                "path_lower": "/reports",
                "id": "id:reports"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .create_folder(&CreateFolderInput::new("/Reports"))
            .await
            .unwrap();

        assert_eq!(
            output,
            CreateFolderOutput {
                name: "Reports".to_string(),
                path_lower: "/reports".to_string(),
                id: "id:reports".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_folder_on_existing_path_is_api_error_not_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/create_folder"))
            .respond_with(conflict("path/conflict/folder/.."))
            .mount(&server)
            .await;

        let err = files_for(&server)
            .create_folder(&CreateFolderInput::new("/Reports"))
            .await
            .unwrap_err();

        let Error::Api(api) = &err else {
            panic!("expected Error::Api, got {err:?}");
        };
        assert_eq!(api.status.as_u16(), 409);
        assert_eq!(api.endpoint, "/files/create_folder");
        assert_eq!(err.api_summary(), Some("path/conflict/folder/.."));
    }

    #[tokio::test]
    async fn test_delete_returns_deleted_entry_metadata() {
        let server = MockServer::start().await;
        let mut deleted = file_metadata("old.txt", 12);
        deleted[".tag"] = json!("file");
        Mock::given(method("POST"))
            .and(path("/2/files/delete"))
            .and(body_json(json!({"path": "/old.txt"})))
            .respond_with(json_response(deleted))
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .delete(&DeleteInput::new("/old.txt"))
            .await
            .unwrap();

        assert!(output.metadata.is_file());
        assert_eq!(output.metadata.name, "old.txt");
        assert_eq!(output.metadata.size, Some(12));
    }

    #[tokio::test]
    async fn test_copy_sends_both_paths() {
        let server = MockServer::start().await;
        let mut copied = file_metadata("b.txt", 3);
        copied[".tag"] = json!("file");
        Mock::given(method("POST"))
            .and(path("/2/files/copy"))
            .and(body_json(json!({"from_path": "/a.txt", "to_path": "/b.txt"})))
            .respond_with(json_response(copied))
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .copy(&CopyInput::new("/a.txt", "/b.txt"))
            .await
            .unwrap();

        assert_eq!(output.metadata.path_lower.as_deref(), Some("/b.txt"));
    }

    #[tokio::test]
    async fn test_move_entry_uses_move_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/move"))
            .and(body_json(json!({"from_path": "/Docs", "to_path": "/Archive/Docs"})))
            .respond_with(json_response(json!({
                ".tag": "folder",
                "name": "Docs",
                "path_lower": "/archive/docs",
                "id": "id:docs"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .move_entry(&MoveInput::new("/Docs", "/Archive/Docs"))
            .await
            .unwrap();

        assert!(output.metadata.is_folder());
        assert_eq!(output.metadata.path_lower.as_deref(), Some("/archive/docs"));
    }

    #[tokio::test]
    async fn test_move_entry_onto_existing_destination_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/move"))
            .respond_with(conflict("to/conflict/file/.."))
            .mount(&server)
            .await;

        let err = files_for(&server)
            .move_entry(&MoveInput::new("/a.txt", "/b.txt"))
            .await
            .unwrap_err();

        assert_eq!(err.api_summary(), Some("to/conflict/file/.."));
    }

    #[tokio::test]
    async fn test_restore_returns_metadata_at_revision() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/restore"))
            .and(body_json(json!({"path": "/notes.txt", "rev": "a1c10ce0dd78"})))
            .respond_with(json_response(file_metadata("notes.txt", 42)))
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .restore(&RestoreInput::new("/notes.txt", "a1c10ce0dd78"))
            .await
            .unwrap();

        assert!(output.metadata.is_file());
        assert_eq!(output.metadata.rev.as_deref(), Some("a1c10ce0dd78"));
    }

    // --- Listing ---

    #[tokio::test]
    async fn test_list_folder_sends_flags_and_returns_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder"))
            .and(body_json(json!({
                "path": "",
                "recursive": true,
                "include_media_info": false,
                "include_deleted": true
            })))
            .respond_with(json_response(json!({
                "entries": [
                    {".tag": "deleted", "name": "gone.txt", "path_lower": "/gone.txt"}
                ],
                "cursor": "cursor-1",
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = ListFolderInput {
            recursive: true,
            include_deleted: true,
            ..ListFolderInput::new("")
        };
        let output = files_for(&server).list_folder(&input).await.unwrap();

        assert_eq!(output.cursor, "cursor-1");
        assert!(!output.has_more);
        assert!(output.entries[0].is_deleted());
    }

    #[tokio::test]
    async fn test_list_folder_entries_follows_cursor_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder"))
            .respond_with(json_response(json!({
                "entries": [{".tag": "file", "name": "a.txt", "path_lower": "/a.txt"}],
                "cursor": "cursor-1",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder/continue"))
            .and(body_json(json!({"cursor": "cursor-1"})))
            .respond_with(json_response(json!({
                "entries": [{".tag": "file", "name": "b.txt", "path_lower": "/b.txt"}],
                "cursor": "cursor-2",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder/continue"))
            .and(body_json(json!({"cursor": "cursor-2"})))
            .respond_with(json_response(json!({
                "entries": [{".tag": "folder", "name": "c", "path_lower": "/c"}],
                "cursor": "cursor-3",
                "has_more": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entries = files_for(&server)
            .list_folder_entries(&ListFolderInput::new(""))
            .await
            .unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt", "c"]);
    }

    #[tokio::test]
    async fn test_list_folder_entries_has_more_without_cursor_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder"))
            .respond_with(json_response(json!({
                "entries": [{".tag": "file", "name": "a.txt", "path_lower": "/a.txt"}],
                "cursor": "",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder/continue"))
            .respond_with(json_response(json!({"entries": [], "cursor": "c", "has_more": false})))
            .expect(0)
            .mount(&server)
            .await;

        let err = files_for(&server)
            .list_folder_entries(&ListFolderInput::new(""))
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Error::MissingCursor { endpoint } if endpoint == "/files/list_folder"),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_list_folder_entries_continue_page_without_cursor_names_continue_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder"))
            .respond_with(json_response(json!({
                "entries": [],
                "cursor": "cursor-1",
                "has_more": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder/continue"))
            .respond_with(json_response(json!({
                "entries": [{".tag": "file", "name": "b.txt", "path_lower": "/b.txt"}],
                "cursor": "",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = files_for(&server)
            .list_folder_entries(&ListFolderInput::new(""))
            .await
            .unwrap_err();

        assert!(
            matches!(&err, Error::MissingCursor { endpoint } if endpoint == "/files/list_folder/continue"),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_list_folder_entries_propagates_continue_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder"))
            .respond_with(json_response(json!({
                "entries": [{".tag": "file", "name": "a.txt", "path_lower": "/a.txt"}],
                "cursor": "cursor-1",
                "has_more": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder/continue"))
            .and(body_json(json!({"cursor": "cursor-1"})))
            .respond_with(conflict("reset/.."))
            .expect(1)
            .mount(&server)
            .await;

        let err = files_for(&server)
            .list_folder_entries(&ListFolderInput::new(""))
            .await
            .unwrap_err();

        let Error::Api(api) = &err else {
            panic!("expected Error::Api, got {err:?}");
        };
        assert_eq!(api.endpoint, "/files/list_folder/continue");
        assert_eq!(err.api_summary(), Some("reset/.."));
    }

    #[tokio::test]
    async fn test_list_folder_continue_with_reset_cursor_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/list_folder/continue"))
            .respond_with(conflict("reset/.."))
            .mount(&server)
            .await;

        let err = files_for(&server)
            .list_folder_continue(&ListFolderContinueInput::new("stale"))
            .await
            .unwrap_err();

        assert_eq!(err.api_summary(), Some("reset/.."));
    }

    // --- Search ---

    #[tokio::test]
    async fn test_search_fills_default_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/search"))
            .and(body_json(json!({
                "path": "",
                "query": "budget",
                "mode": "filename"
            })))
            .respond_with(json_response(json!({
                "matches": [],
                "more": false,
                "start": 0
            })))
            .expect(2)
            .mount(&server)
            .await;

        let files = files_for(&server);

        let mut defaulted = SearchInput::new("", "budget");
        files.search(&mut defaulted).await.unwrap();
        assert_eq!(defaulted.mode, Some(SearchMode::Filename));

        let mut explicit = SearchInput {
            mode: Some(SearchMode::Filename),
            ..SearchInput::new("", "budget")
        };
        files.search(&mut explicit).await.unwrap();
        assert_eq!(defaulted, explicit);
    }

    #[tokio::test]
    async fn test_search_keeps_explicit_mode_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/search"))
            .and(body_json(json!({
                "path": "/Finance",
                "query": "q3",
                "start": 100,
                "max_results": 50,
                "mode": "filename_and_content"
            })))
            .respond_with(json_response(json!({
                "matches": [
                    {
                        "match_type": {".tag": "content"},
                        "metadata": {
                            ".tag": "file",
                            "name": "q3.xlsx",
                            "path_lower": "/finance/q3.xlsx",
                            "size": 2048
                        }
                    }
                ],
                "more": true,
                "start": 150
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut input = SearchInput {
            start: Some(100),
            max_results: Some(50),
            mode: Some(SearchMode::FilenameAndContent),
            ..SearchInput::new("/Finance", "q3")
        };
        let output = files_for(&server).search(&mut input).await.unwrap();

        assert_eq!(input.mode, Some(SearchMode::FilenameAndContent));
        assert_eq!(output.matches.len(), 1);
        assert_eq!(output.matches[0].match_type, SearchMatchType::Content);
        assert_eq!(output.matches[0].metadata.size, Some(2048));
        assert!(output.more);
        assert_eq!(output.start, 150);
    }

    // --- Upload / download ---

    #[tokio::test]
    async fn test_upload_sends_argument_header_and_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/upload"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/octet-stream"))
            .and(api_arg(json!({
                "path": "/a.txt",
                "mode": "overwrite",
                "autorename": true,
                "mute": true
            })))
            .and(body_string("hello"))
            .respond_with(json_response(file_metadata("a.txt", 5)))
            .expect(1)
            .mount(&server)
            .await;

        let input = UploadInput {
            mode: WriteMode::Overwrite,
            autorename: true,
            mute: true,
            ..UploadInput::new("/a.txt", "hello")
        };
        let output = files_for(&server).upload(input).await.unwrap();

        assert!(output.metadata.is_file());
        assert_eq!(output.metadata.size, Some(5));
    }

    #[tokio::test]
    async fn test_upload_streams_chunked_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/upload"))
            .and(body_string("hello world"))
            .respond_with(json_response(file_metadata("greeting.txt", 11)))
            .expect(1)
            .mount(&server)
            .await;

        let chunks = futures::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from("hello ")),
            Ok(Bytes::from("world")),
        ]);
        let output = files_for(&server)
            .upload(UploadInput::new(
                "/greeting.txt",
                UploadBody::from_stream(chunks),
            ))
            .await
            .unwrap();

        assert_eq!(output.metadata.size, Some(11));
    }

    #[tokio::test]
    async fn test_upload_stream_read_error_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/upload"))
            .respond_with(json_response(file_metadata("a.txt", 5)))
            .mount(&server)
            .await;

        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from("hel")),
            Err(std::io::Error::other("disk read failed")),
        ]);
        let err = files_for(&server)
            .upload(UploadInput::new("/a.txt", UploadBody::from_stream(chunks)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(json_response(file_metadata("big.bin", 0)))
            .expect(0)
            .mount(&server)
            .await;

        let oversized = usize::try_from(UPLOAD_SIZE_LIMIT + 1).unwrap();
        let err = files_for(&server)
            .upload(UploadInput::new("/big.bin", vec![0_u8; oversized]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::UploadTooLarge { size, limit } if size == UPLOAD_SIZE_LIMIT + 1 && limit == UPLOAD_SIZE_LIMIT
        ));
    }

    #[test]
    fn test_ensure_upload_size_allows_unknown_and_exact_lengths() {
        let stream = futures::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from("x"))]);

        assert!(ensure_upload_size(&UploadBody::from_stream(stream), 0).is_ok());
        assert!(ensure_upload_size(&UploadBody::from("12345"), 5).is_ok());
        assert!(ensure_upload_size(&UploadBody::from("123456"), 5).is_err());
    }

    #[tokio::test]
    async fn test_upload_add_conflict_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/upload"))
            .respond_with(conflict("path/conflict/file/.."))
            .mount(&server)
            .await;

        let err = files_for(&server)
            .upload(UploadInput::new("/a.txt", "hello"))
            .await
            .unwrap_err();

        assert_eq!(err.api_summary(), Some("path/conflict/file/.."));
    }

    #[tokio::test]
    async fn test_download_returns_metadata_and_streamed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/download"))
            .and(header("authorization", "Bearer test-token"))
            .and(api_arg(json!({"path": "/report.pdf"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "Dropbox-API-Result",
                        file_metadata("report.pdf", 7).to_string().as_str(),
                    )
                    .set_body_raw("%PDF-1.", "application/octet-stream"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let output = files_for(&server)
            .download(&DownloadInput::new("/report.pdf"))
            .await
            .unwrap();

        let metadata = output.metadata.unwrap();
        assert_eq!(metadata.name, "report.pdf");
        assert_eq!(metadata.size, Some(7));
        assert_eq!(output.body.bytes().await.unwrap(), Bytes::from("%PDF-1."));
    }

    #[tokio::test]
    async fn test_download_folder_fails_instead_of_empty_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/download"))
            .respond_with(conflict("path/not_file/.."))
            .mount(&server)
            .await;

        let err = files_for(&server)
            .download(&DownloadInput::new("/Documents"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(_)));
        assert_eq!(err.api_summary(), Some("path/not_file/.."));
    }

    #[tokio::test]
    async fn test_download_with_malformed_result_header_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Dropbox-API-Result", "{not json")
                    .set_body_raw("x", "application/octet-stream"),
            )
            .mount(&server)
            .await;

        let err = files_for(&server)
            .download(&DownloadInput::new("/a.txt"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode { .. }), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_upload_then_download_round_trips_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/files/upload"))
            .and(api_arg(json!({
                "path": "/a.txt",
                "mode": "add",
                "autorename": false,
                "mute": false
            })))
            .and(body_string("hello"))
            .respond_with(json_response(json!({
                "name": "a.txt",
                "path_lower": "/a.txt",
                "id": "id:a",
                "rev": "015",
                "size": 5
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/files/download"))
            .and(api_arg(json!({"path": "/a.txt"})))
            .respond_with(ResponseTemplate::new(200).set_body_raw("hello", "application/octet-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let files = files_for(&server);
        let uploaded = files
            .upload(UploadInput::new("/a.txt", "hello"))
            .await
            .unwrap();
        assert_eq!(uploaded.metadata.name, "a.txt");
        assert_eq!(uploaded.metadata.size, Some(5));
        assert_eq!(uploaded.metadata.tag, Tag::File);

        let mut download = files.download(&DownloadInput::new("/a.txt")).await.unwrap();
        assert!(download.metadata.is_none());

        let mut content = Vec::new();
        while let Some(chunk) = download.body.chunk().await.unwrap() {
            content.extend_from_slice(&chunk);
        }
        assert_eq!(content, b"hello");
    }
}
