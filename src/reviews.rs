//! Customer reviews feed.
//!
//! Reviews are listed newest first with cursor pagination. Incremental
//! syncs stop at the newest review id already stored.

use std::collections::HashSet;

use serde::Serialize;

use crate::client::AnalyticsClient;
use crate::error::Result;
use crate::models::RawRecord;

/// Default number of reviews requested per page.
pub const DEFAULT_REVIEW_PAGE_SIZE: u32 = 200;

/// Query for the reviews feed.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewQuery {
    /// Sort order; newest first.
    pub sort: &'static str,
    /// Page size.
    pub limit: u32,
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            sort: "-createdDate",
            limit: DEFAULT_REVIEW_PAGE_SIZE,
        }
    }
}

/// Walks an app's customer reviews.
#[derive(Debug, Clone, Copy)]
pub struct ReviewPaginator<'a> {
    client: &'a AnalyticsClient,
    page_size: u32,
}

impl<'a> ReviewPaginator<'a> {
    /// Create a paginator using `client`.
    pub fn new(client: &'a AnalyticsClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_REVIEW_PAGE_SIZE,
        }
    }

    /// Request `page_size` reviews per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch reviews newest first.
    ///
    /// Stops before `stop_at_review_id` when it is seen, when there is no
    /// next page, or after `page_limit` pages. Reviews repeated across pages
    /// are returned once.
    ///
    /// # Errors
    ///
    /// Returns the first request failure.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_reviews(
        &self,
        app_id: &str,
        stop_at_review_id: Option<&str>,
        page_limit: Option<u32>,
    ) -> Result<Vec<RawRecord>> {
        let path = format!("apps/{}/customerReviews", urlencoding::encode(app_id));
        let query = ReviewQuery {
            limit: self.page_size,
            ..ReviewQuery::default()
        };

        let mut reviews = Vec::new();
        let mut seen = HashSet::new();
        let mut pages = 0;
        let mut page = self.client.fetch_page(&path, Some(&query)).await?;

        loop {
            pages += 1;

            for entry in &page.data {
                let Some(review) = RawRecord::from_value(entry) else {
                    tracing::warn!(%entry, "Skipped: review is not a resource object");
                    continue;
                };

                if stop_at_review_id == Some(review.id.as_str()) {
                    tracing::info!(count = reviews.len(), pages, "Reached known review");
                    return Ok(reviews);
                }

                if seen.insert(review.id.clone()) {
                    reviews.push(review);
                } else {
                    tracing::debug!(id = %review.id, "Skipped duplicate review");
                }
            }

            if page_limit.is_some_and(|limit| pages >= limit) {
                tracing::info!(pages, "Reached page limit");
                break;
            }

            let Some(next) = page.next_url().map(str::to_owned) else {
                break;
            };
            page = self.client.fetch_page::<()>(&next, None).await?;
        }

        tracing::info!(count = reviews.len(), pages, "Fetched reviews");
        Ok(reviews)
    }
}
