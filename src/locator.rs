//! Resolve a report selection to downloadable segments.
//!
//! The walk is report requests → reports → instances → segments. A branch
//! that yields nothing is logged and skipped; only an empty result for a
//! whole level is an error.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::client::AnalyticsClient;
use crate::error::{AnalyticsError, Result};
use crate::extract::{extract_attribute_strings, extract_attribute_values, extract_ids};
use crate::models::{
    InstanceFilter, NoFilter, ReportInstances, ReportRequests, ReportSegments, ReportSpec,
    Reports, RequestFilter, Segment,
};
use crate::traits::List;

/// Walks the report hierarchy for one client.
#[derive(Debug, Clone, Copy)]
pub struct ReportLocator<'a> {
    client: &'a AnalyticsClient,
}

impl<'a> ReportLocator<'a> {
    /// Create a locator using `client`.
    pub fn new(client: &'a AnalyticsClient) -> Self {
        Self { client }
    }

    /// Ids of the app's report requests.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NoReportRequests`] when the app has none.
    #[tracing::instrument(skip(self))]
    pub async fn report_request_ids(&self, app_id: &str) -> Result<Vec<String>> {
        let records =
            ReportRequests::list_all(self.client, app_id, &RequestFilter::default()).await?;

        extract_ids(&records).map_err(|_| AnalyticsError::NoReportRequests {
            app_id: app_id.to_string(),
        })
    }

    /// Ids of the reports matching `spec` across every request of the app.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NoReportsFound`] if no request contains the report.
    #[tracing::instrument(skip(self, spec), fields(report = %spec.name))]
    pub async fn report_ids(&self, spec: &ReportSpec) -> Result<Vec<String>> {
        let request_ids = self.report_request_ids(&spec.app_id).await?;
        let filter = spec.report_filter();

        let mut report_ids = Vec::new();
        for request_id in &request_ids {
            let records = Reports::list_all(self.client, request_id, &filter).await?;
            match extract_ids(&records) {
                Ok(ids) => push_unique(&mut report_ids, ids),
                Err(_) => tracing::debug!(request_id, "No matching reports under request"),
            }
        }

        if report_ids.is_empty() {
            return Err(AnalyticsError::NoReportsFound {
                app_id: spec.app_id.clone(),
                name: spec.name.to_string(),
            });
        }

        tracing::info!(count = report_ids.len(), "Found reports");
        Ok(report_ids)
    }

    /// Attributes of every report available to the app, across all requests.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NoReportRequests`] if the app has no requests.
    #[tracing::instrument(skip(self))]
    pub async fn list_reports(&self, app_id: &str) -> Result<Vec<Value>> {
        let request_ids = self.report_request_ids(app_id).await?;

        let mut reports = Vec::new();
        for request_id in &request_ids {
            let records = Reports::list_all(self.client, request_id, &Default::default()).await?;
            if let Ok(attributes) = extract_attribute_values(&records, None) {
                reports.extend(attributes);
            }
        }

        Ok(reports)
    }

    /// Processing dates with instances for `spec`, sorted ascending.
    ///
    /// # Errors
    ///
    /// Propagates request and report lookup failures.
    #[tracing::instrument(skip(self, spec), fields(report = %spec.name))]
    pub async fn list_available_dates(&self, spec: &ReportSpec) -> Result<Vec<NaiveDate>> {
        let report_ids = self.report_ids(spec).await?;
        let dates = self.available_dates(&report_ids, spec).await?;
        Ok(dates.into_iter().collect())
    }

    /// Segment URLs for `spec`, sorted lexicographically.
    ///
    /// Segment URLs embed their processing date, so lexicographic order
    /// follows chronological order for the current URL scheme. Prefer
    /// [`resolve_segments`](Self::resolve_segments), which orders by the
    /// instance's processing date explicitly.
    ///
    /// # Errors
    ///
    /// See [`resolve_segments`](Self::resolve_segments).
    pub async fn resolve_segment_urls(&self, spec: &ReportSpec) -> Result<Vec<String>> {
        let mut urls: Vec<String> = self
            .resolve_segments(spec)
            .await?
            .into_iter()
            .map(|segment| segment.url)
            .collect();
        urls.sort();
        urls.dedup();
        Ok(urls)
    }

    /// Segments for `spec`, sorted by processing date then URL.
    ///
    /// # Errors
    ///
    /// Returns the "no X found" error for the first level of the hierarchy
    /// that comes back empty, or the first request failure.
    #[tracing::instrument(skip(self, spec), fields(report = %spec.name, granularity = %spec.granularity))]
    pub async fn resolve_segments(&self, spec: &ReportSpec) -> Result<Vec<Segment>> {
        let report_ids = self.report_ids(spec).await?;

        let dates = match &spec.dates {
            Some(dates) => dates.clone(),
            None => self.available_dates(&report_ids, spec).await?,
        };

        let mut instances: Vec<(String, String, NaiveDate)> = Vec::new();
        for report_id in &report_ids {
            for &date in &dates {
                let filter = InstanceFilter::new(spec.granularity).on(date);
                let records = ReportInstances::list_all(self.client, report_id, &filter).await?;
                match extract_ids(&records) {
                    Ok(ids) => instances.extend(
                        ids.into_iter()
                            .map(|instance_id| (report_id.clone(), instance_id, date)),
                    ),
                    Err(_) => tracing::debug!(report_id, %date, "No instances for date"),
                }
            }
        }

        if instances.is_empty() {
            return Err(AnalyticsError::NoInstancesFound {
                name: spec.name.to_string(),
            });
        }

        let mut segments = BTreeSet::new();
        for (report_id, instance_id, date) in instances {
            let records =
                ReportSegments::list_all(self.client, &instance_id, &NoFilter::default()).await?;
            match extract_attribute_strings(&records, "url") {
                Ok(urls) => segments.extend(urls.into_iter().map(|url| Segment {
                    processing_date: Some(date),
                    url,
                    report_id: report_id.clone(),
                    instance_id: instance_id.clone(),
                })),
                Err(_) => tracing::warn!(instance_id, "Instance has no segment URLs"),
            }
        }

        if segments.is_empty() {
            return Err(AnalyticsError::NoSegmentsFound {
                name: spec.name.to_string(),
            });
        }

        tracing::info!(count = segments.len(), "Resolved segments");
        Ok(segments.into_iter().collect())
    }

    /// Union of processing dates across `report_ids`.
    async fn available_dates(
        &self,
        report_ids: &[String],
        spec: &ReportSpec,
    ) -> Result<BTreeSet<NaiveDate>> {
        let filter = InstanceFilter::new(spec.granularity);
        let mut dates = BTreeSet::new();

        for report_id in report_ids {
            let records = ReportInstances::list_all(self.client, report_id, &filter).await?;
            let Ok(values) = extract_attribute_strings(&records, "processingDate") else {
                tracing::debug!(report_id, "Report has no instances");
                continue;
            };

            for value in values {
                match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
                    Ok(date) => {
                        dates.insert(date);
                    }
                    Err(e) => tracing::warn!(value, error = %e, "Skipped: unparsable processingDate"),
                }
            }
        }

        tracing::debug!(count = dates.len(), "Available processing dates");
        Ok(dates)
    }
}

fn push_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
