//! File handlers: listing, download and upload.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, Redirect, Response},
    Json,
};
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::share::{ByteStream, FileInfo};
use crate::web::dto::ApiResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::view::render_index;

/// Name of the multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// GET / - Listing page with the upload form.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let files = state.listing.list_files().await;
    Html(render_index(&files))
}

/// GET /api/files - Listing as JSON.
pub async fn list_files_json(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<FileInfo>>> {
    let files = state.listing.list_files().await;
    Json(ApiResponse::new(files))
}

/// GET /files/:file_name - Stream a file to the client as an attachment.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let download = state.transfer.download(&file_name).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_DISPOSITION, download.content_disposition)
        .header(header::CONTENT_LENGTH, download.size)
        .body(Body::from_stream(download.body))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST / - Upload a file from a multipart form, then go back to the listing.
///
/// The client is redirected whatever the outcome, including requests that are not
/// valid multipart forms; failures are logged.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Redirect {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!("Rejected upload: {}", rejection.body_text());
            return Redirect::to("/");
        }
    };

    match spool_upload(multipart, state.max_upload_size).await {
        Ok(upload) => {
            let body: ByteStream = Box::pin(ReaderStream::new(upload.file));
            if let Err(e) = state
                .transfer
                .upload(&upload.file_name, body, upload.size)
                .await
            {
                tracing::error!("Failed to upload {}: {}", upload.file_name, e);
            }
        }
        Err(e) => tracing::warn!("Rejected upload: {}", e),
    }

    Redirect::to("/")
}

/// An uploaded file parked on local disk until it is sent to the share.
struct SpooledUpload {
    file_name: String,
    /// Anonymous temporary file, rewound; removed by the OS once closed.
    file: File,
    size: u64,
}

/// Copy the file field of the form into a spool file, keeping at most `max_size` bytes.
async fn spool_upload(mut multipart: Multipart, max_size: u64) -> Result<SpooledUpload, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(base_name)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("No file selected"))?;

        let mut file = create_spool_file().await?;
        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            tracing::error!("Failed to read file content: {}", e);
            ApiError::bad_request("Failed to read file")
        })? {
            size += chunk.len() as u64;
            if size > max_size {
                let max_mb = max_size / 1024 / 1024;
                return Err(ApiError::bad_request(format!(
                    "File too large (max {}MB)",
                    max_mb
                )));
            }
            file.write_all(&chunk).await.map_err(spool_error)?;
        }

        file.flush().await.map_err(spool_error)?;
        file.seek(SeekFrom::Start(0)).await.map_err(spool_error)?;

        return Ok(SpooledUpload {
            file_name,
            file,
            size,
        });
    }

    Err(ApiError::bad_request("No file provided"))
}

/// Create an anonymous temporary file in the system temp directory.
async fn create_spool_file() -> Result<File, ApiError> {
    let file = tokio::task::spawn_blocking(tempfile::tempfile)
        .await
        .map_err(|e| {
            tracing::error!("Spool file task failed: {}", e);
            ApiError::internal("Failed to buffer upload")
        })?
        .map_err(spool_error)?;
    Ok(File::from_std(file))
}

fn spool_error(e: std::io::Error) -> ApiError {
    tracing::error!("Failed to buffer upload: {}", e);
    ApiError::internal("Failed to buffer upload")
}

/// Strip any directory part a browser may send along with the file name.
fn base_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_spool_file_reads_back_after_rewind() {
        let mut file = create_spool_file().await.unwrap();
        file.write_all(b"spooled ").await.unwrap();
        file.write_all(b"content").await.unwrap();
        file.flush().await.unwrap();
        file.seek(SeekFrom::Start(0)).await.unwrap();

        let mut stream = ReaderStream::new(file);
        let mut out = Vec::new();
        while let Some(piece) = stream.next().await {
            out.extend_from_slice(&piece.unwrap());
        }

        assert_eq!(out, b"spooled content");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("report.pdf"), "report.pdf");
        assert_eq!(base_name("C:\\Users\\me\\report.pdf"), "report.pdf");
        assert_eq!(base_name("/home/me/my file.txt"), "my file.txt");
        assert_eq!(base_name("dir/"), "");
    }
}
