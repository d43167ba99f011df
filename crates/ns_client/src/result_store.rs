use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use ns_core::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Latest,
    Oldest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" | "newest" => Ok(SortOrder::Latest),
            "oldest" => Ok(SortOrder::Oldest),
            other => Err(format!("Invalid sort order: {} (expected latest or oldest)", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Latest => write!(f, "latest"),
            SortOrder::Oldest => write!(f, "oldest"),
        }
    }
}

/// Stable sort by publish time; missing or unparseable times count as the earliest.
pub fn sort_by_date(articles: &[Article], order: SortOrder) -> Vec<Article> {
    let mut sorted = articles.to_vec();
    let key = |a: &Article| a.published_time().map(|t| t.timestamp_millis()).unwrap_or(i64::MIN);
    match order {
        SortOrder::Latest => sorted.sort_by_key(|a| Reverse(key(a))),
        SortOrder::Oldest => sorted.sort_by_key(key),
    }
    sorted
}

/// Every article fetched for the active query, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    articles: Vec<Article>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.articles.clear();
    }

    pub fn append(&mut self, articles: impl IntoIterator<Item = Article>) {
        self.articles.extend(articles);
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn sorted_by_date(&self, order: SortOrder) -> Vec<Article> {
        sort_by_date(&self.articles, order)
    }
}
