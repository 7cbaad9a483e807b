use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::range::{parse_range_header, ByteRange};
use crate::sniff::{ContentSniffer, FALLBACK_MIME, SNIFF_LEN};

/// Upper bound on a single body chunk.
pub const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug)]
pub enum StreamError {
    NotFound(PathBuf),
    Internal(io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::NotFound(path) => write!(f, "file not found: {}", path.display()),
            StreamError::Internal(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::NotFound(_) => None,
            StreamError::Internal(err) => Some(err),
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        StreamError::Internal(err)
    }
}

/// Serves files as chunked bodies, honouring single `Range` requests.
///
/// The open file moves into the body stream and is closed whenever hyper drops
/// the body, including when the client disconnects mid-transfer.
#[derive(Clone)]
pub struct RangeStreamer {
    sniffer: Arc<dyn ContentSniffer>,
}

impl RangeStreamer {
    pub fn new(sniffer: Arc<dyn ContentSniffer>) -> Self {
        Self { sniffer }
    }

    /// Full body with `200`, or the requested slice with `206`. A range that
    /// cannot be parsed or satisfied falls back to the full body.
    pub async fn serve(&self, path: &Path, range: Option<&str>) -> Result<Response, StreamError> {
        let (mut file, size) = open_file(path).await?;
        let mime = self.sniff(&mut file).await?;

        let range = range.and_then(|value| match parse_range_header(value, size) {
            Ok(range) => Some(range),
            Err(err) => {
                debug!(
                    "Ignoring range {:?} for {} ({} bytes): {:?}",
                    value,
                    path.display(),
                    size,
                    err
                );
                None
            }
        });

        match range {
            Some(range) => partial_response(file, size, range, &mime).await,
            None => Ok(full_response(file, size, &mime, true)),
        }
    }

    /// Full body with a caller-chosen content type and no range support.
    pub async fn serve_fixed(
        &self,
        path: &Path,
        content_type: &str,
    ) -> Result<Response, StreamError> {
        let (file, size) = open_file(path).await?;
        Ok(full_response(file, size, content_type, false))
    }

    async fn sniff(&self, file: &mut File) -> Result<String, StreamError> {
        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut *file)
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .await?;
        file.seek(SeekFrom::Start(0)).await?;
        Ok(self.sniffer.detect(&head))
    }
}

async fn open_file(path: &Path) -> Result<(File, u64), StreamError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        // A prefix component that is a regular file means the path does not exist either.
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            return Err(StreamError::NotFound(path.to_path_buf()))
        }
        Err(err) => return Err(StreamError::Internal(err)),
    };
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(StreamError::NotFound(path.to_path_buf()));
    }
    Ok((file, metadata.len()))
}

fn full_response(file: File, size: u64, mime: &str, accept_ranges: bool) -> Response {
    let mut response = stream_body(file, size);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type_value(mime));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    if accept_ranges {
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    }
    response
}

async fn partial_response(
    mut file: File,
    size: u64,
    range: ByteRange,
    mime: &str,
) -> Result<Response, StreamError> {
    file.seek(SeekFrom::Start(range.start)).await?;
    let content_range = HeaderValue::from_str(&range.content_range(size))
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    let mut response = stream_body(file, range.len());
    *response.status_mut() = StatusCode::PARTIAL_CONTENT;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type_value(mime));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(range.len()));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_RANGE, content_range);
    Ok(response)
}

// Ends after `len` bytes or at EOF, whichever comes first.
fn stream_body(file: File, len: u64) -> Response {
    let stream = ReaderStream::with_capacity(file.take(len), CHUNK_SIZE);
    Response::new(Body::from_stream(stream))
}

fn content_type_value(mime: &str) -> HeaderValue {
    HeaderValue::from_str(mime).unwrap_or(HeaderValue::from_static(FALLBACK_MIME))
}
