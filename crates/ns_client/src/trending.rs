use chrono::{DateTime, Utc};
use ns_core::Article;

use crate::error::FetchError;
use crate::render::{render_trending_item, Node};
use crate::result_store::{sort_by_date, SortOrder};

pub const TRENDING_DISPLAY_LIMIT: usize = 15;
pub const TRENDING_UNAVAILABLE: &str = "Unable to load trending.";

/// Sidebar state. It never feeds back into the main grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrendingPanel {
    #[default]
    Loading,
    Loaded(Vec<Article>),
    Unavailable,
}

impl TrendingPanel {
    pub fn from_result(result: Result<Vec<Article>, FetchError>) -> Self {
        match result {
            Ok(articles) => {
                let mut sorted = sort_by_date(&articles, SortOrder::Latest);
                sorted.retain(|a| !a.is_placeholder());
                sorted.truncate(TRENDING_DISPLAY_LIMIT);
                TrendingPanel::Loaded(sorted)
            }
            Err(_) => TrendingPanel::Unavailable,
        }
    }

    pub fn render(&self, now: DateTime<Utc>) -> Vec<Node> {
        match self {
            TrendingPanel::Loading => Vec::new(),
            TrendingPanel::Loaded(articles) => articles
                .iter()
                .map(|article| render_trending_item(article, now))
                .collect(),
            TrendingPanel::Unavailable => vec![Node::element("p")
                .attr("class", "trending-item-meta")
                .child(Node::text(TRENDING_UNAVAILABLE))],
        }
    }
}
