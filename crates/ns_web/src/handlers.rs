use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use ns_core::{AggregatedResult, Article, Error, QuerySpec, Result, LATEST_ENDPOINT};
use ns_sources::Logger;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 50;
pub const TRENDING_LIMIT: usize = 10;
pub const TRENDING_COUNTRIES: &str = "us,gb,in,ca,au";
pub const TRENDING_CATEGORIES: [&str; 8] = [
    "top",
    "world",
    "business",
    "technology",
    "entertainment",
    "sports",
    "health",
    "science",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesParams {
    pub country: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    pub language: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingParams {
    pub page_size: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesResponse {
    pub status: &'static str,
    pub total_results_approx: usize,
    pub articles: Vec<Article>,
    pub next_continuation_token: Option<String>,
}

impl From<AggregatedResult> for ArticlesResponse {
    fn from(result: AggregatedResult) -> Self {
        Self {
            status: "ok",
            total_results_approx: result.total_results_approx,
            articles: result.articles,
            next_continuation_token: result.next_continuation_token,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub articles: Vec<Article>,
    pub total_results_approx: usize,
}

/// Leading digits of `raw`, defaulting to 20 and capped at 50.
pub fn parse_page_size(raw: Option<&str>) -> usize {
    let digits: String = raw
        .unwrap_or_default()
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<usize>() {
        Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
        Ok(size) => size.min(MAX_PAGE_SIZE),
    }
}

fn failure(logger: &Logger, err: Error) -> ApiError {
    logger.error(&err.to_string());
    ApiError::from(err)
}

/// Runs the aggregator for `query`, optionally overriding the language filter.
pub async fn aggregate(state: &AppState, query: &QuerySpec, language: Option<&str>, size: usize) -> Result<AggregatedResult> {
    let mut filters = query.filters();
    if let Some(language) = language {
        filters.set("language", language.trim());
    }
    state
        .aggregator
        .collect(LATEST_ENDPOINT, &filters, query.page(), size)
        .await
}

pub async fn headlines(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HeadlinesParams>,
) -> std::result::Result<Json<ArticlesResponse>, ApiError> {
    let logger = Logger::new().with_prefix("[headlines]");
    let country = params
        .country
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("us");
    let query = QuerySpec::headlines(country, params.category.as_deref()).with_page(params.page);
    let size = parse_page_size(params.page_size.as_deref());

    let result = aggregate(&state, &query, None, size)
        .await
        .map_err(|e| failure(&logger, e))?;
    Ok(Json(result.into()))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<ArticlesResponse>, ApiError> {
    let logger = Logger::new().with_prefix("[search]");
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(ApiError::from(Error::Validation(
            "Search query \"q\" is required".to_string(),
        )));
    }
    let query = QuerySpec::search(term).with_page(params.page);
    let language = params.language.as_deref().filter(|l| !l.trim().is_empty());
    let size = parse_page_size(params.page_size.as_deref());

    let result = aggregate(&state, &query, language, size)
        .await
        .map_err(|e| failure(&logger, e))?;
    Ok(Json(result.into()))
}

/// A random category per call stands in for freshness; the provider exposes
/// no ranking signal.
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingParams>,
) -> std::result::Result<Json<TrendingResponse>, ApiError> {
    let logger = Logger::new().with_prefix("[trending]");
    let limit = params
        .page_size
        .as_deref()
        .map(|raw| parse_page_size(Some(raw)).min(TRENDING_LIMIT))
        .unwrap_or(TRENDING_LIMIT);

    let response = collect_trending(&state, limit)
        .await
        .map_err(|e| failure(&logger, e))?;
    Ok(Json(response))
}

/// One upstream call across the trending countries for a random category.
pub async fn collect_trending(state: &AppState, limit: usize) -> Result<TrendingResponse> {
    let category = pick_category(&mut rand::thread_rng());
    Logger::new().with_prefix("[trending]").debug(&format!("category {}", category));

    let filters = QuerySpec::Trending
        .filters()
        .with("country", TRENDING_COUNTRIES)
        .with("category", category);
    let page = state
        .aggregator
        .provider()
        .fetch_page(LATEST_ENDPOINT, &filters, None)
        .await?;

    let (articles, total_results_approx) = shape_trending(page.articles, limit, &mut rand::thread_rng());
    Ok(TrendingResponse {
        articles,
        total_results_approx,
    })
}

pub fn pick_category<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    TRENDING_CATEGORIES.choose(rng).copied().unwrap_or("top")
}

/// Drops placeholders, shuffles, dedups by URL and keeps `limit` articles.
/// Also returns the unique count before truncation.
pub fn shape_trending<R: Rng + ?Sized>(articles: Vec<Article>, limit: usize, rng: &mut R) -> (Vec<Article>, usize) {
    let mut articles: Vec<Article> = articles.into_iter().filter(|a| !a.is_placeholder()).collect();
    articles.shuffle(rng);

    let mut seen = HashSet::new();
    articles.retain(|a| seen.insert(a.url.clone()));

    let total = articles.len();
    articles.truncate(limit);
    (articles, total)
}

pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ns_core::REMOVED_TITLE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn article(url: &str, title: &str) -> Article {
        Article {
            url: url.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("30")), 30);
        assert_eq!(parse_page_size(Some("30abc")), 30);
        assert_eq!(parse_page_size(Some("500")), MAX_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("0")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("-5")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("lots")), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_shape_trending() {
        let mut input = vec![
            article("https://t.test/removed", REMOVED_TITLE),
            article("https://t.test/untitled", ""),
        ];
        for i in 0..14 {
            input.push(article(&format!("https://t.test/{}", i), &format!("Story {}", i)));
        }
        input.push(article("https://t.test/3", "Story 3 again"));

        let mut rng = StdRng::seed_from_u64(7);
        let (articles, total) = shape_trending(input, TRENDING_LIMIT, &mut rng);

        assert_eq!(total, 14);
        assert_eq!(articles.len(), TRENDING_LIMIT);
        let urls: HashSet<_> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls.len(), articles.len());
        assert!(articles.iter().all(|a| a.title != REMOVED_TITLE && !a.title.is_empty()));
    }

    #[test]
    fn test_shape_trending_keeps_everything_but_order() {
        let input: Vec<_> = (0..6)
            .map(|i| article(&format!("https://t.test/{}", i), &format!("Story {}", i)))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let (mut articles, total) = shape_trending(input.clone(), TRENDING_LIMIT, &mut rng);
        assert_eq!(total, 6);
        articles.sort_by(|a, b| a.url.cmp(&b.url));
        assert_eq!(articles, input);
    }

    #[test]
    fn test_pick_category() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert!(TRENDING_CATEGORIES.contains(&pick_category(&mut rng)));
        }
    }
}
