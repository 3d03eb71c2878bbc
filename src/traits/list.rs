//! List trait for fetching resource collections.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::client::AnalyticsClient;
use crate::error::Result;

/// A collection nested under a parent resource.
///
/// Implementors name the collection path for a parent id and the filter
/// type sent as query parameters on the first page request.
///
/// # Example
///
/// ```ignore
/// use asc_analytics::{AnalyticsClient, List, ReportInstances, InstanceFilter, Granularity};
///
/// let client = AnalyticsClient::from_env()?;
/// let filter = InstanceFilter::new(Granularity::Daily);
/// let instances = ReportInstances::list_all(&client, "r1-report-id", &filter).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Filter: Serialize + Send + Sync;

    /// Collection path relative to the API root.
    fn path(parent_id: &str) -> String;

    /// Fetch every record of the collection, following pagination links.
    ///
    /// # Arguments
    ///
    /// * `client` - The App Store Connect client
    /// * `parent_id` - Id of the owning resource
    /// * `filter` - Query parameters for filtering
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(
        client: &AnalyticsClient,
        parent_id: &str,
        filter: &Self::Filter,
    ) -> Result<Vec<Value>> {
        client.fetch_all(&Self::path(parent_id), filter).await
    }
}
