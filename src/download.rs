//! Download and parse report segments.
//!
//! Segments are gzip-compressed tab-separated files with a header row.

use std::collections::HashSet;
use std::io::Read;

use flate2::read::GzDecoder;
use serde_json::{Map, Value};

use crate::client::AnalyticsClient;
use crate::error::AnalyticsError;

/// One parsed row: normalized column name → value.
pub type DataRow = Map<String, Value>;

/// Why a segment produced no rows.
#[derive(Debug)]
pub enum SegmentFailure {
    /// The HTTP request failed or returned an error status.
    Http(AnalyticsError),
    /// The body is not a valid gzip archive.
    Archive(std::io::Error),
    /// The decompressed body is not UTF-8.
    Encoding(std::string::FromUtf8Error),
}

impl std::fmt::Display for SegmentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Archive(e) => write!(f, "malformed gzip archive: {e}"),
            Self::Encoding(e) => write!(f, "invalid UTF-8: {e}"),
        }
    }
}

/// Fetches segment files and turns them into rows.
#[derive(Debug, Clone, Copy)]
pub struct SegmentDownloader<'a> {
    client: &'a AnalyticsClient,
}

impl<'a> SegmentDownloader<'a> {
    /// Create a downloader using `client`'s connection pool.
    pub fn new(client: &'a AnalyticsClient) -> Self {
        Self { client }
    }

    /// Download one segment.
    ///
    /// Returns `None` when the segment can't be retrieved or decoded; the
    /// cause is logged. A single bad segment never aborts a batch.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, url: &str) -> Option<Vec<DataRow>> {
        match self.try_download(url).await {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "Downloaded segment");
                Some(rows)
            }
            Err(failure) => {
                tracing::warn!(%failure, "Segment skipped");
                None
            }
        }
    }

    /// Download one segment, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`SegmentFailure`] naming the failing stage.
    pub async fn try_download(&self, url: &str) -> Result<Vec<DataRow>, SegmentFailure> {
        let body = self
            .client
            .download_bytes(url)
            .await
            .map_err(SegmentFailure::Http)?;
        let text = decompress(&body)?;
        Ok(parse_tsv(&text))
    }
}

/// Gunzip a segment body and decode it as UTF-8.
///
/// # Errors
///
/// Returns [`SegmentFailure::Archive`] or [`SegmentFailure::Encoding`].
pub fn decompress(body: &[u8]) -> Result<String, SegmentFailure> {
    let mut decoded = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(SegmentFailure::Archive)?;
    String::from_utf8(decoded).map_err(SegmentFailure::Encoding)
}

/// Parse tab-separated text with a header row.
///
/// Header names are normalized with [`normalize_header`]. Blank lines are
/// skipped, short rows are padded with empty strings and surplus fields
/// are dropped.
pub fn parse_tsv(text: &str) -> Vec<DataRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<String> = header.split('\t').map(normalize_header).collect();

    let mut distinct = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !distinct.insert(column.as_str()) {
            tracing::warn!(column, "Duplicate column after normalization, later field wins");
        }
    }

    lines
        .map(|line| {
            let mut fields = line.split('\t');
            columns
                .iter()
                .map(|column| {
                    let field = fields.next().unwrap_or_default();
                    (column.clone(), Value::String(field.to_string()))
                })
                .collect()
        })
        .collect()
}

/// Lowercase a column name and replace spaces and hyphens with underscores.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}
