//! App Store Connect analytics CLI binary.
//!
//! A command-line interface for the analytics report pipeline.

use std::process::ExitCode;

use asc_analytics::cli::{Cli, Command, ReportArgs};
use asc_analytics::output::{write_jsonl, write_to_path, PrettyPrint};
use asc_analytics::{
    AnalyticsClient, Category, DatasetAssembler, ReportLocator, ReportName, ReviewPaginator,
};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("asc_analytics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // The static report table needs no credentials
    if let Command::Names { category } = &cli.command {
        return match handle_names(*category, cli.json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let client = match AnalyticsClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set ASC_ISSUER_ID, ASC_KEY_ID and ASC_PRIVATE_KEY_PATH environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &AnalyticsClient, cli: Cli) -> asc_analytics::Result<()> {
    match cli.command {
        Command::Names { category } => handle_names(category, cli.json),
        Command::Reports { app_id } => handle_reports(client, &app_id, cli.json).await,
        Command::Dates(report) => handle_dates(client, &report, cli.json).await,
        Command::Urls(report) => handle_urls(client, &report, cli.json).await,
        Command::Data { report, output } => {
            let spec = report.to_spec();
            let segments = ReportLocator::new(client).resolve_segments(&spec).await?;
            let dataset = DatasetAssembler::new(client)
                .assemble_segments(&segments)
                .await;

            match output {
                Some(path) => {
                    write_to_path(dataset.rows(), &path)?;
                    eprintln!("Wrote {} rows to {}", dataset.len(), path.display());
                }
                None if cli.json => {
                    println!("{}", serde_json::to_string_pretty(&dataset)?);
                }
                None => write_jsonl(dataset.rows(), std::io::stdout().lock())?,
            }
            Ok(())
        }
        Command::Reviews {
            app_id,
            stop_at,
            pages,
            page_size,
        } => {
            let reviews = ReviewPaginator::new(client)
                .with_page_size(page_size)
                .fetch_reviews(&app_id, stop_at.as_deref(), pages)
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reviews)?);
            } else {
                for review in &reviews {
                    println!("{}\n", review.pretty_print());
                }
                println!("{} reviews", reviews.len());
            }
            Ok(())
        }
    }
}

fn handle_names(category: Option<Category>, json: bool) -> asc_analytics::Result<()> {
    let rows: Vec<NameRow> = ReportName::ALL
        .iter()
        .filter(|name| category.map_or(true, |c| name.category() == c))
        .map(|&name| NameRow::from(name))
        .collect();
    output_rows(&rows, json)
}

async fn handle_reports(
    client: &AnalyticsClient,
    app_id: &str,
    json: bool,
) -> asc_analytics::Result<()> {
    let reports = ReportLocator::new(client).list_reports(app_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let rows: Vec<ReportRow> = reports.iter().map(ReportRow::from).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

async fn handle_dates(
    client: &AnalyticsClient,
    report: &ReportArgs,
    json: bool,
) -> asc_analytics::Result<()> {
    let dates = ReportLocator::new(client)
        .list_available_dates(&report.to_spec())
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dates)?);
    } else {
        for date in &dates {
            println!("{date}");
        }
    }
    Ok(())
}

async fn handle_urls(
    client: &AnalyticsClient,
    report: &ReportArgs,
    json: bool,
) -> asc_analytics::Result<()> {
    let segments = ReportLocator::new(client)
        .resolve_segments(&report.to_spec())
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
    } else {
        let rows: Vec<SegmentRow> = segments
            .iter()
            .map(|s| SegmentRow {
                date: s.processing_date.map(|d| d.to_string()).unwrap_or_default(),
                instance: s.instance_id.clone(),
                url: s.url.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

fn output_rows<R: Tabled + Serialize>(rows: &[R], json: bool) -> asc_analytics::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled, Serialize)]
struct NameRow {
    name: &'static str,
    category: &'static str,
}

impl From<ReportName> for NameRow {
    fn from(name: ReportName) -> Self {
        Self {
            name: name.name(),
            category: name.category().as_str(),
        }
    }
}

#[derive(Tabled)]
struct ReportRow {
    name: String,
    category: String,
}

impl From<&Value> for ReportRow {
    fn from(attributes: &Value) -> Self {
        let field = |key: &str| {
            attributes
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            name: field("name"),
            category: field("category"),
        }
    }
}

#[derive(Tabled)]
struct SegmentRow {
    date: String,
    instance: String,
    url: String,
}
