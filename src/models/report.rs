//! Report hierarchy resources, their filters, and the report selection.
//!
//! The hierarchy is: report requests (per app) → reports → instances
//! (one per granularity bucket and processing date) → segments (downloadable
//! chunks).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::category::{Category, Granularity};
use super::report_name::ReportName;
use crate::traits::List;

/// Standing report requests of an app.
#[derive(Debug)]
pub struct ReportRequests;

/// Reports produced under a report request.
#[derive(Debug)]
pub struct Reports;

/// Time-bucketed instances of a report.
#[derive(Debug)]
pub struct ReportInstances;

/// Downloadable segments of a report instance.
#[derive(Debug)]
pub struct ReportSegments;

/// Filter for report requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestFilter {
    /// Request access type (`ONGOING` or `ONE_TIME_SNAPSHOT`).
    #[serde(rename = "filter[accessType]", skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
}

/// Filter for reports of a request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportFilter {
    /// Report category.
    #[serde(rename = "filter[category]", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Report display name.
    #[serde(rename = "filter[name]", skip_serializing_if = "Option::is_none")]
    pub name: Option<ReportName>,
}

/// Filter for instances of a report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstanceFilter {
    /// Instance granularity.
    #[serde(rename = "filter[granularity]", skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,

    /// Processing date of the instance.
    #[serde(rename = "filter[processingDate]", skip_serializing_if = "Option::is_none")]
    pub processing_date: Option<NaiveDate>,
}

impl InstanceFilter {
    /// Instances of one granularity, any date.
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity: Some(granularity),
            processing_date: None,
        }
    }

    /// Restrict to one processing date.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.processing_date = Some(date);
        self
    }
}

/// Segments take no filter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoFilter {}

impl List for ReportRequests {
    type Filter = RequestFilter;

    fn path(app_id: &str) -> String {
        format!("apps/{}/analyticsReportRequests", urlencoding::encode(app_id))
    }
}

impl List for Reports {
    type Filter = ReportFilter;

    fn path(request_id: &str) -> String {
        format!("analyticsReportRequests/{}/reports", urlencoding::encode(request_id))
    }
}

impl List for ReportInstances {
    type Filter = InstanceFilter;

    fn path(report_id: &str) -> String {
        format!("analyticsReports/{}/instances", urlencoding::encode(report_id))
    }
}

impl List for ReportSegments {
    type Filter = NoFilter;

    fn path(instance_id: &str) -> String {
        format!("analyticsReportInstances/{}/segments", urlencoding::encode(instance_id))
    }
}

/// The logical report to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSpec {
    /// App Store app id.
    pub app_id: String,
    /// Report name.
    pub name: ReportName,
    /// Report category, derived from the name unless overridden.
    pub category: Category,
    /// Instance granularity.
    pub granularity: Granularity,
    /// Processing dates to fetch; every available date when `None`.
    pub dates: Option<BTreeSet<NaiveDate>>,
}

impl ReportSpec {
    /// Select a report for an app, with the category taken from the name.
    pub fn new(app_id: impl Into<String>, name: ReportName, granularity: Granularity) -> Self {
        Self {
            app_id: app_id.into(),
            name,
            category: name.category(),
            granularity,
            dates: None,
        }
    }

    /// Only fetch the given processing dates.
    #[must_use]
    pub fn with_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.dates = Some(dates.into_iter().collect());
        self
    }

    /// Override the derived category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// The filter used when listing reports of a request.
    pub fn report_filter(&self) -> ReportFilter {
        ReportFilter {
            category: Some(self.category),
            name: Some(self.name),
        }
    }
}

/// A downloadable segment together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Segment {
    /// Processing date of the owning instance.
    pub processing_date: Option<NaiveDate>,
    /// Presigned download URL.
    pub url: String,
    /// Owning report id.
    pub report_id: String,
    /// Owning instance id.
    pub instance_id: String,
}
