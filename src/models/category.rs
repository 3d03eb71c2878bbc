//! Report categories and instance granularities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Functional grouping of analytics reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Impressions, product page views, discovery sources.
    AppStoreEngagement,
    /// Downloads, purchases, pre-orders.
    AppStoreCommerce,
    /// Installs, deletions, sessions.
    AppUsage,
    /// Use of system frameworks and features.
    FrameworkUsage,
    /// Launch, install and runtime performance.
    Performance,
}

impl Category {
    /// Every category.
    pub const ALL: [Category; 5] = [
        Self::AppStoreEngagement,
        Self::AppStoreCommerce,
        Self::AppUsage,
        Self::FrameworkUsage,
        Self::Performance,
    ];

    /// The value used in `filter[category]`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppStoreEngagement => "APP_STORE_ENGAGEMENT",
            Self::AppStoreCommerce => "APP_STORE_COMMERCE",
            Self::AppUsage => "APP_USAGE",
            Self::FrameworkUsage => "FRAMEWORK_USAGE",
            Self::Performance => "PERFORMANCE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Time bucket of a report instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    /// One instance per day.
    #[default]
    Daily,
    /// One instance per week.
    Weekly,
    /// One instance per month.
    Monthly,
}

impl Granularity {
    /// The value used in `filter[granularity]`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            _ => Err(format!("unknown granularity '{s}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_filter_values() {
        for category in Category::ALL {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.as_str());
        }
        assert_eq!(serde_json::to_value(Granularity::Weekly).unwrap(), "WEEKLY");
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("app_usage".parse::<Category>().unwrap(), Category::AppUsage);
        assert_eq!("daily".parse::<Granularity>().unwrap(), Granularity::Daily);
        assert!("hourly".parse::<Granularity>().is_err());
    }
}
