use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider path serving both the headline listing and keyword search.
pub const LATEST_ENDPOINT: &str = "/latest";

/// Title the provider substitutes for articles that were taken down.
pub const REMOVED_TITLE: &str = "[Removed]";

/// Provider-neutral article shape shared by the proxy and its clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub published_at: Option<String>,
    pub source_name: String,
}

impl Article {
    /// Parsed publish time, `None` when absent or in an unknown format.
    pub fn published_time(&self) -> Option<DateTime<Utc>> {
        self.published_at.as_deref().and_then(parse_timestamp)
    }

    /// Untitled or removed entries the provider keeps in its listings.
    pub fn is_placeholder(&self) -> bool {
        self.title.trim().is_empty() || self.title == REMOVED_TITLE
    }
}

/// Accepts RFC 3339, NewsData's `YYYY-MM-DD HH:MM:SS` (UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Filter parameters forwarded verbatim to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Filters::set`].
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Empty values are dropped so they never reach the provider.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.0.remove(key);
        } else {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a caller asked for. `page` is the provider's opaque continuation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpec {
    Headlines {
        country: String,
        category: Option<String>,
        page: Option<String>,
    },
    Search {
        term: String,
        page: Option<String>,
    },
    Trending,
}

impl QuerySpec {
    pub fn headlines(country: &str, category: Option<&str>) -> Self {
        Self::Headlines {
            country: country.trim().to_lowercase(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            page: None,
        }
    }

    pub fn search(term: &str) -> Self {
        Self::Search {
            term: term.trim().to_string(),
            page: None,
        }
    }

    /// Same query, continued from the given provider token.
    pub fn with_page(self, token: Option<String>) -> Self {
        match self {
            Self::Headlines { country, category, .. } => Self::Headlines { country, category, page: token },
            Self::Search { term, .. } => Self::Search { term, page: token },
            Self::Trending => Self::Trending,
        }
    }

    pub fn page(&self) -> Option<&str> {
        match self {
            Self::Headlines { page, .. } | Self::Search { page, .. } => page.as_deref(),
            Self::Trending => None,
        }
    }

    /// Provider filters for this query, excluding the continuation token.
    pub fn filters(&self) -> Filters {
        let filters = Filters::new().with("language", "en");
        match self {
            Self::Headlines { country, category, .. } => filters
                .with("country", country.as_str())
                .with("category", category.clone().unwrap_or_default()),
            Self::Search { term, .. } => filters.with("q", term.as_str()),
            Self::Trending => filters,
        }
    }
}

/// One upstream page. A missing token means the provider is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFetchResult {
    pub articles: Vec<Article>,
    pub continuation_token: Option<String>,
}

/// Several upstream pages stitched together and deduplicated by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    pub articles: Vec<Article>,
    /// Articles collected before truncation, not the provider's corpus size.
    pub total_results_approx: usize,
    pub next_continuation_token: Option<String>,
}
