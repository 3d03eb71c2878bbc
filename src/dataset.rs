//! Merge segment rows into one clean dataset.
//!
//! Later segments re-deliver corrected data for dates already seen, so rows
//! are grouped by their `date` column and the latest segment carrying a date
//! wins for that date. The merged rows are then type-coerced and exact
//! duplicates removed.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::client::AnalyticsClient;
use crate::download::{DataRow, SegmentDownloader};
use crate::error::Result;
use crate::locator::ReportLocator;
use crate::models::{ReportSpec, Segment};

/// Column used to group rows when merging segments.
pub const DATE_COLUMN: &str = "date";

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("valid integer pattern"));
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid decimal pattern")
});

/// An ordered, deduplicated set of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<DataRow>,
}

impl Dataset {
    /// Coerce and deduplicate `rows` into a dataset.
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        Self {
            rows: deduplicate(rows),
        }
    }

    /// The rows, in order.
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    /// Take ownership of the rows.
    pub fn into_rows(self) -> Vec<DataRow> {
        self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, taken from the first row.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Distinct non-null values of `column`, in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Vec<&Value> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_null())
            .filter(|value| seen.insert(value.to_string()))
            .collect()
    }

    /// Rows whose `column` satisfies `comparator` against `value`.
    ///
    /// Rows without the column are dropped, as are rows whose value can't be
    /// compared with `value` (an ordering between a string and a number, or
    /// membership in something that is neither an array, a string nor an
    /// object).
    ///
    /// # Example
    ///
    /// ```
    /// use asc_analytics::{Comparator, Dataset};
    /// use serde_json::json;
    ///
    /// let rows = serde_json::from_value(json!([
    ///     {"territory": "US", "counts": "12"},
    ///     {"territory": "FR", "counts": "3"}
    /// ]))
    /// .unwrap();
    /// let dataset = Dataset::from_rows(rows);
    ///
    /// let busy = dataset.filter("counts", ">=".parse().unwrap(), &json!(10));
    /// assert_eq!(busy.len(), 1);
    ///
    /// let eu = dataset.filter("territory", Comparator::In, &json!(["FR", "DE"]));
    /// assert_eq!(eu.rows()[0]["territory"], "FR");
    /// ```
    #[must_use]
    pub fn filter(&self, column: &str, comparator: Comparator, value: &Value) -> Dataset {
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.get(column)
                    .is_some_and(|field| comparator.matches(field, value))
            })
            .cloned()
            .collect();
        Dataset { rows }
    }
}

/// How [`Dataset::filter`] compares a column with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `in`: the column value is an element of an array, a substring of a
    /// string, or a key of an object.
    In,
    /// `not in`
    NotIn,
}

impl Comparator {
    /// Every comparator.
    pub const ALL: [Comparator; 8] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Lt,
        Self::Ge,
        Self::Le,
        Self::In,
        Self::NotIn,
    ];

    /// The operator as written, e.g. `">="` or `"not in"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }

    /// Apply the comparison to a column value.
    pub fn matches(self, field: &Value, value: &Value) -> bool {
        match self {
            Self::Eq => values_equal(field, value),
            Self::Ne => !values_equal(field, value),
            Self::Gt => compare(field, value) == Some(Ordering::Greater),
            Self::Lt => compare(field, value) == Some(Ordering::Less),
            Self::Ge => matches!(compare(field, value), Some(Ordering::Greater | Ordering::Equal)),
            Self::Le => matches!(compare(field, value), Some(Ordering::Less | Ordering::Equal)),
            Self::In => contains(value, field) == Some(true),
            Self::NotIn => contains(value, field) == Some(false),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("unsupported comparator '{s}', expected one of {known:?}")
            })
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Whether `haystack` contains `needle`; `None` when membership is undefined.
fn contains(haystack: &Value, needle: &Value) -> Option<bool> {
    match (haystack, needle) {
        (Value::Array(items), _) => Some(items.iter().any(|item| values_equal(item, needle))),
        (Value::String(text), Value::String(part)) => Some(text.contains(part.as_str())),
        (Value::Object(map), Value::String(key)) => Some(map.contains_key(key)),
        _ => None,
    }
}

impl IntoIterator for Dataset {
    type Item = DataRow;
    type IntoIter = std::vec::IntoIter<DataRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DataRow;
    type IntoIter = std::slice::Iter<'a, DataRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Downloads segments and merges them into a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct DatasetAssembler<'a> {
    downloader: SegmentDownloader<'a>,
}

impl<'a> DatasetAssembler<'a> {
    /// Create an assembler using `client`.
    pub fn new(client: &'a AnalyticsClient) -> Self {
        Self {
            downloader: SegmentDownloader::new(client),
        }
    }

    /// Download `urls` in lexicographic order and merge them.
    ///
    /// Lexicographic URL order stands in for processing order. Segments that
    /// fail to download are skipped.
    #[tracing::instrument(skip(self, urls), fields(segments = urls.len()))]
    pub async fn assemble(&self, urls: &[String]) -> Dataset {
        let mut ordered: Vec<&str> = urls.iter().map(String::as_str).collect();
        ordered.sort_unstable();
        ordered.dedup();

        let mut batches = Vec::with_capacity(ordered.len());
        for url in ordered {
            if let Some(rows) = self.downloader.download(url).await {
                batches.push(rows);
            }
        }

        finish(batches)
    }

    /// Download `segments` ordered by processing date, then URL, and merge them.
    #[tracing::instrument(skip(self, segments), fields(segments = segments.len()))]
    pub async fn assemble_segments(&self, segments: &[Segment]) -> Dataset {
        let mut ordered: Vec<&Segment> = segments.iter().collect();
        ordered.sort();
        let mut seen = HashSet::new();
        ordered.retain(|&segment| seen.insert(segment.url.as_str()));

        let mut batches = Vec::with_capacity(ordered.len());
        for segment in ordered {
            if let Some(rows) = self.downloader.download(&segment.url).await {
                batches.push(rows);
            }
        }

        finish(batches)
    }
}

/// Resolve and download a report, returning the merged dataset.
///
/// # Example
///
/// ```no_run
/// use asc_analytics::{get_data, AnalyticsClient, Granularity, ReportName, ReportSpec};
///
/// # async fn example() -> asc_analytics::Result<()> {
/// let client = AnalyticsClient::from_env()?;
/// let spec = ReportSpec::new(
///     "950949627",
///     ReportName::AppStoreInstallationAndDeletionDetailed,
///     Granularity::Daily,
/// );
/// let dataset = get_data(&client, &spec).await?;
/// println!("{} rows", dataset.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the locator's error when the report can't be resolved.
pub async fn get_data(client: &AnalyticsClient, spec: &ReportSpec) -> Result<Dataset> {
    let segments = ReportLocator::new(client).resolve_segments(spec).await?;
    Ok(DatasetAssembler::new(client)
        .assemble_segments(&segments)
        .await)
}

fn finish(batches: Vec<Vec<DataRow>>) -> Dataset {
    let segments = batches.len();
    let merged = merge_by_date(batches);
    let dataset = Dataset::from_rows(merged);
    tracing::info!(segments, rows = dataset.len(), "Assembled dataset");
    dataset
}

/// Merge per-segment batches, later batches replacing earlier rows by date.
///
/// For every `date` value present in a batch, that batch's rows replace all
/// rows previously held for the date. Rows without a `date` column form
/// their own group. The result is ordered by date, rows without a date
/// first.
pub fn merge_by_date(batches: Vec<Vec<DataRow>>) -> Vec<DataRow> {
    let mut by_date: BTreeMap<Option<String>, Vec<DataRow>> = BTreeMap::new();

    for batch in batches {
        let mut groups: BTreeMap<Option<String>, Vec<DataRow>> = BTreeMap::new();
        for row in batch {
            groups.entry(date_key(&row)).or_default().push(row);
        }

        for (date, rows) in groups {
            if let Some(replaced) = by_date.insert(date.clone(), rows) {
                tracing::debug!(
                    date = date.as_deref().unwrap_or("<none>"),
                    replaced = replaced.len(),
                    "Later segment replaces rows for date"
                );
            }
        }
    }

    by_date.into_values().flatten().collect()
}

fn date_key(row: &DataRow) -> Option<String> {
    match row.get(DATE_COLUMN)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Coerce a raw string field.
///
/// Empty strings become null, integers and decimals become numbers,
/// anything else stays a string. Non-string values pass through.
pub fn coerce_value(value: Value) -> Value {
    let Value::String(s) = value else {
        return value;
    };

    if s.is_empty() {
        return Value::Null;
    }

    if INTEGER.is_match(&s) {
        if let Ok(n) = s.parse::<i64>() {
            return Value::Number(n.into());
        }
    } else if DECIMAL.is_match(&s) {
        if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    Value::String(s)
}

/// Coerce every value and drop exact duplicates.
///
/// The first row's columns define the output shape: missing columns are
/// filled with null and columns absent from the first row are dropped.
pub fn deduplicate(rows: Vec<DataRow>) -> Vec<DataRow> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    let original = rows.len();

    let mut seen = HashSet::with_capacity(original);
    let mut unique = Vec::with_capacity(original);

    for mut row in rows {
        let normalized: DataRow = columns
            .iter()
            .map(|column| {
                let value = row.remove(column).map(coerce_value).unwrap_or(Value::Null);
                (column.clone(), value)
            })
            .collect();

        let fingerprint = Value::Object(normalized.clone()).to_string();
        if seen.insert(fingerprint) {
            unique.push(normalized);
        }
    }

    tracing::info!(
        duplicated = original - unique.len(),
        original,
        deduplicated = unique.len(),
        "Removed duplicate rows"
    );

    unique
}
