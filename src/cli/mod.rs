//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! asc-analytics binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::{Category, Granularity, ReportName, ReportSpec};

/// App Store Connect analytics command-line interface.
#[derive(Parser, Debug)]
#[command(name = "asc-analytics", about = "App Store Connect analytics reports CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List known report names and their categories.
    Names {
        /// Only show reports in this category.
        #[arg(long)]
        category: Option<Category>,
    },

    /// List reports available to an app.
    Reports {
        /// App Store app id.
        app_id: String,
    },

    /// List processing dates available for a report.
    Dates(ReportArgs),

    /// List segment download URLs for a report.
    Urls(ReportArgs),

    /// Download and merge a report.
    Data {
        #[command(flatten)]
        report: ReportArgs,

        /// Write rows to this file (.csv for CSV, JSON Lines otherwise).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Fetch customer reviews, newest first.
    Reviews {
        /// App Store app id.
        app_id: String,

        /// Stop before this review id.
        #[arg(long)]
        stop_at: Option<String>,

        /// Maximum number of pages.
        #[arg(long)]
        pages: Option<u32>,

        /// Reviews per page.
        #[arg(long, default_value_t = crate::reviews::DEFAULT_REVIEW_PAGE_SIZE)]
        page_size: u32,
    },
}

/// Selects one report of an app.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// App Store app id.
    pub app_id: String,

    /// Report display name (e.g. "App Sessions Standard").
    pub report: ReportName,

    /// Instance granularity.
    #[arg(long, short, default_value = "DAILY")]
    pub granularity: Granularity,

    /// Processing date (YYYY-MM-DD); repeat for several. All dates when omitted.
    #[arg(long = "date", short)]
    pub dates: Vec<NaiveDate>,
}

impl ReportArgs {
    /// Build the report selection.
    pub fn to_spec(&self) -> ReportSpec {
        let spec = ReportSpec::new(&self.app_id, self.report, self.granularity);
        if self.dates.is_empty() {
            spec
        } else {
            spec.with_dates(self.dates.iter().copied())
        }
    }
}
