//! Error types for App Store Connect analytics operations.

use thiserror::Error;

/// Errors that can occur while retrieving analytics reports.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Credential fields are empty or the private key is unusable.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Requested token lifetime is outside the allowed window.
    #[error("Token lifetime must be between 1 and {max_secs} seconds, got {lifetime_secs}")]
    InvalidLifetime { lifetime_secs: u64, max_secs: u64 },

    /// Configuration is missing or incomplete.
    #[error("Configuration required: {0}")]
    ConfigMissing(String),

    /// Network-level failure reaching the API or a segment URL.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    ResourceFetch { status: u16, body: String },

    /// The response did not have the expected `{"data": [...]}` shape.
    #[error("Unexpected payload format: {0}")]
    PayloadFormat(String),

    /// No record in the payload carried a usable id.
    #[error("No valid ids found in the payload")]
    NoValidIds,

    /// No record in the payload carried a usable attribute value.
    #[error("No valid values for attribute {}", attribute.as_deref().unwrap_or("<attributes>"))]
    NoValidValues { attribute: Option<String> },

    /// The app has no report requests.
    #[error("No report requests found for app '{app_id}'")]
    NoReportRequests { app_id: String },

    /// None of the report requests contain the requested report.
    #[error("No reports named '{name}' found for app '{app_id}'")]
    NoReportsFound { app_id: String, name: String },

    /// The report has no instances for the requested dates.
    #[error("No instances found for report '{name}'")]
    NoInstancesFound { name: String },

    /// The report instances have no downloadable segments.
    #[error("No segments found for report '{name}'")]
    NoSegmentsFound { name: String },

    /// Token signing failed.
    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local I/O error (key files, output files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    /// Returns the HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ResourceFetch { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error only signals that a lookup produced nothing.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            Self::NoValidIds
                | Self::NoValidValues { .. }
                | Self::NoReportRequests { .. }
                | Self::NoReportsFound { .. }
                | Self::NoInstancesFound { .. }
                | Self::NoSegmentsFound { .. }
        )
    }
}

/// Result type alias for analytics operations.
pub type Result<T> = core::result::Result<T, AnalyticsError>;
