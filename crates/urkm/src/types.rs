use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date label written for pages that carry no date header of their own.
/// The archive starts at 2012/1/1, so the placeholder points just past it.
pub const PLACEHOLDER_DATE_LABEL: &str = "2012/1/2/";

/// Calendar triple used to build archive URLs. Not a `NaiveDate`: the day
/// grid runs 1–31 for every month, so Feb 30 and friends are representable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DateKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        DateKey {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.month, self.day)
    }
}

/// One day's news-listing page on the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    pub date: DateKey,
    pub url: String,
}

impl Display for ListingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// A single extracted headline. `date_label` is the text of the date header
/// in effect for the page, or a fallback; `title` may be empty when the
/// headline element has no direct text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub date_label: String,
    pub title: String,
}

impl Display for Headline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.date_label, self.title)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid fallback strategy '{0}'. Accepted values: 'placeholder', 'from-url'")]
pub struct FallbackDateParseError(String);

/// Where the date label comes from when a page has no date header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackDate {
    Placeholder,
    FromUrl,
}

impl FallbackDate {
    pub fn slug(&self) -> &'static str {
        match self {
            FallbackDate::Placeholder => "placeholder",
            FallbackDate::FromUrl => "from-url",
        }
    }

    /// Resolve the fallback label for one listing URL.
    pub fn label_for(&self, url: &str) -> String {
        match self {
            FallbackDate::Placeholder => PLACEHOLDER_DATE_LABEL.to_string(),
            FallbackDate::FromUrl => crate::urls::date_label_from_url(url)
                .unwrap_or_else(|| PLACEHOLDER_DATE_LABEL.to_string()),
        }
    }
}

impl FromStr for FallbackDate {
    type Err = FallbackDateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placeholder" => Ok(FallbackDate::Placeholder),
            "from-url" | "url" => Ok(FallbackDate::FromUrl),
            _ => Err(FallbackDateParseError(s.to_string())),
        }
    }
}

impl Display for FallbackDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid output mode '{0}'. Accepted values: 'append', 'truncate'")]
pub struct OutputModeParseError(String);

/// How the output file is opened at the start of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Append to whatever is already there; never write a header row.
    Append,
    /// Truncate the file and write the `date;title` header once.
    Truncate,
}

impl OutputMode {
    pub fn slug(&self) -> &'static str {
        match self {
            OutputMode::Append => "append",
            OutputMode::Truncate => "truncate",
        }
    }
}

impl FromStr for OutputMode {
    type Err = OutputModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(OutputMode::Append),
            "truncate" => Ok(OutputMode::Truncate),
            _ => Err(OutputModeParseError(s.to_string())),
        }
    }
}

impl Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}
