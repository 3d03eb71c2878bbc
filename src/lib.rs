//! App Store Connect Analytics Reports client library.
//!
//! Retrieves analytics reports by walking the report hierarchy
//! (report requests → reports → instances → segments), downloading the
//! gzip-compressed TSV segments and merging them into one deduplicated
//! dataset per report.
//!
//! # Quick Start
//!
//! ```no_run
//! use asc_analytics::{AnalyticsClient, Granularity, ReportLocator, ReportName, ReportSpec};
//!
//! #[tokio::main]
//! async fn main() -> asc_analytics::Result<()> {
//!     // Create client from environment variables
//!     let client = AnalyticsClient::from_env()?;
//!
//!     let spec = ReportSpec::new("950949627", ReportName::AppSessionsStandard, Granularity::Daily);
//!
//!     // Which processing dates exist?
//!     let dates = ReportLocator::new(&client).list_available_dates(&spec).await?;
//!     println!("{} dates available", dates.len());
//!
//!     // Fetch and merge everything
//!     let dataset = asc_analytics::get_data(&client, &spec).await?;
//!     println!("{} rows", dataset.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Credentials`] signs a short-lived ES256 token for every request
//! - [`AnalyticsClient`] performs authenticated, retried, paginated reads
//! - [`extract_ids`] and [`extract_attribute_values`] pull data out of raw records
//! - [`ReportLocator`] resolves a [`ReportSpec`] to [`Segment`]s
//! - [`SegmentDownloader`] turns a segment URL into rows
//! - [`DatasetAssembler`] merges segments into a [`Dataset`]
//! - [`ReviewPaginator`] walks the customer reviews feed
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `ASC_ISSUER_ID` (required) - Issuer id of the API key
//! - `ASC_KEY_ID` (required) - API key id
//! - `ASC_PRIVATE_KEY` or `ASC_PRIVATE_KEY_PATH` (required) - The `.p8` key
//! - `ASC_API_URL` (optional) - Base URL (defaults to `https://api.appstoreconnect.apple.com/v1`)

pub mod cli;
mod client;
mod config;
mod credentials;
mod dataset;
mod download;
mod error;
mod extract;
mod locator;
mod models;
pub mod output;
mod pagination;
mod reviews;
mod traits;

// Re-export core types
pub use client::AnalyticsClient;
pub use config::{ClientConfig, RetryPolicy, DEFAULT_API_URL};
pub use credentials::{
    issue_token, Credentials, Token, TokenClaims, MAX_TOKEN_LIFETIME, TOKEN_AUDIENCE,
};
pub use error::{AnalyticsError, Result};
pub use pagination::{Links, Page};

// Re-export traits
pub use traits::List;

// Re-export models
pub use models::{
    Category, Granularity, InstanceFilter, NoFilter, RawRecord, ReportFilter, ReportInstances,
    ReportName, ReportRequests, ReportSegments, ReportSpec, Reports, RequestFilter, Segment,
};

// Re-export pipeline stages
pub use dataset::{
    coerce_value, deduplicate, get_data, merge_by_date, Comparator, Dataset, DatasetAssembler,
    DATE_COLUMN,
};
pub use download::{decompress, normalize_header, parse_tsv, DataRow, SegmentDownloader, SegmentFailure};
pub use extract::{extract_attribute_strings, extract_attribute_values, extract_ids};
pub use locator::ReportLocator;
pub use reviews::{ReviewPaginator, ReviewQuery, DEFAULT_REVIEW_PAGE_SIZE};
