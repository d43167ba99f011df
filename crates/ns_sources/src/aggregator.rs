use std::collections::HashSet;
use std::sync::Arc;

use ns_core::{AggregatedResult, Article, Filters, NewsProvider, Result};

use crate::logging::Logger;

/// Upper bound on upstream calls for a single `collect`, to stay inside the
/// provider's rate limits.
pub const MAX_UPSTREAM_REQUESTS: usize = 5;

/// Stitches several provider pages into one title-unique result set.
#[derive(Clone)]
pub struct Aggregator {
    provider: Arc<dyn NewsProvider>,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn NewsProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn NewsProvider> {
        &self.provider
    }

    /// Pull pages sequentially, starting at `start`, until `requested_size`
    /// unique articles are collected, the provider runs out, or
    /// [`MAX_UPSTREAM_REQUESTS`] calls were made. Any upstream error aborts the
    /// whole collection.
    pub async fn collect(
        &self,
        endpoint: &str,
        filters: &Filters,
        start: Option<&str>,
        requested_size: usize,
    ) -> Result<AggregatedResult> {
        let logger = Logger::new().with_prefix(format!("[{}{}]", self.provider.name(), endpoint));
        let mut collected: Vec<Article> = Vec::new();
        let mut cursor = start.map(str::to_string);
        let mut next_token = None;

        for call in 1..=MAX_UPSTREAM_REQUESTS {
            let page = self.provider.fetch_page(endpoint, filters, cursor.as_deref()).await?;
            let fetched = page.articles.len();

            collected.extend(dedup_by_title(page.articles));
            collected = dedup_by_title(collected);
            logger.debug(&format!(
                "call {}: {} fetched, {} unique collected",
                call,
                fetched,
                collected.len()
            ));

            match page.continuation_token {
                Some(token) => {
                    cursor = Some(token.clone());
                    next_token = Some(token);
                }
                None => {
                    next_token = None;
                    break;
                }
            }

            if collected.len() >= requested_size {
                break;
            }
        }

        let total_results_approx = collected.len();
        collected.truncate(requested_size);
        logger.info(&format!(
            "returning {} of {} collected articles (more: {})",
            collected.len(),
            total_results_approx,
            next_token.is_some()
        ));

        Ok(AggregatedResult {
            articles: collected,
            total_results_approx,
            next_continuation_token: next_token,
        })
    }
}

/// Keeps the first article for each title, dropping untitled ones.
pub fn dedup_by_title(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| !article.title.is_empty() && seen.insert(article.title.clone()))
        .collect()
}
