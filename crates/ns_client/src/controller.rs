use ns_core::{AggregatedResult, Article, QuerySpec};
use tracing::debug;

use crate::error::FetchError;
use crate::result_store::{sort_by_date, ResultStore, SortOrder};
use crate::session::{Phase, SessionState};

/// Articles requested per page; matches the proxy's `pageSize` cap.
pub const DEFAULT_PAGE_SIZE: usize = 50;

pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub cursor: usize,
    pub query: QuerySpec,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    QueryChanged(QuerySpec),
    LoadMoreRequested,
    /// The load-more affordance scrolled into view.
    SentinelVisible,
    Retry,
    SortChanged(SortOrder),
    FetchCompleted {
        generation: u64,
        result: Result<AggregatedResult, FetchError>,
    },
}

/// What the view (or the fetch driver) has to do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(FetchRequest),
    ShowLoading(bool),
    ClearGrid,
    /// Cards to add after the ones already shown.
    AppendArticles(Vec<Article>),
    ShowError { message: String, retryable: bool },
    HideError,
    ShowNoResults(bool),
    SetLoadMoreVisible(bool),
    SetResultsLabel(String),
    ScrollToTop,
}

/// Pagination and render controller for the main grid.
#[derive(Debug, Clone)]
pub struct Controller {
    state: SessionState,
    store: ResultStore,
    page_size: usize,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Controller {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: SessionState::new(),
            store: ResultStore::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::QueryChanged(query) => self.on_query(query),
            Event::LoadMoreRequested | Event::SentinelVisible => self.on_load_more(),
            Event::Retry => self.on_retry(),
            Event::SortChanged(order) => self.on_sort(order),
            Event::FetchCompleted { generation, result } => self.on_completed(generation, result),
        }
    }

    fn on_query(&mut self, query: QuerySpec) -> Vec<Effect> {
        if let QuerySpec::Search { term, .. } = &query {
            if term.trim().is_empty() {
                return Vec::new();
            }
        }
        self.state = self.state.begin_query(query.with_page(None));
        self.store.reset();

        let mut effects = vec![
            Effect::ClearGrid,
            Effect::ShowNoResults(false),
            Effect::SetLoadMoreVisible(false),
        ];
        effects.extend(self.start_fetch());
        effects
    }

    fn on_load_more(&mut self) -> Vec<Effect> {
        if self.state.is_loading() || !self.state.has_more {
            return Vec::new();
        }
        self.state = self.state.begin_next_page();
        self.start_fetch()
    }

    fn on_retry(&mut self) -> Vec<Effect> {
        if !matches!(self.state.phase, Phase::Error { .. }) {
            return Vec::new();
        }
        if self.state.cursor <= 1 {
            return match self.state.query.clone() {
                Some(query) => self.on_query(query),
                None => Vec::new(),
            };
        }
        self.state = self.state.begin_retry();
        self.start_fetch()
    }

    fn on_sort(&mut self, order: SortOrder) -> Vec<Effect> {
        self.state = self.state.sorted(order);
        if self.store.is_empty() {
            return Vec::new();
        }
        vec![
            Effect::ClearGrid,
            Effect::AppendArticles(visible(self.store.sorted_by_date(order))),
        ]
    }

    fn on_completed(&mut self, generation: u64, result: Result<AggregatedResult, FetchError>) -> Vec<Effect> {
        if generation != self.state.generation || !self.state.is_loading() {
            debug!(
                "Dropping stale completion (generation {}, current {})",
                generation, self.state.generation
            );
            return Vec::new();
        }

        let mut effects = vec![Effect::ShowLoading(false)];
        match result {
            Ok(page) => {
                let first_page = self.state.cursor == 1;
                if first_page && page.articles.is_empty() {
                    self.state = self.state.empty();
                    effects.push(Effect::SetResultsLabel(self.results_label()));
                    effects.push(Effect::ShowNoResults(true));
                    effects.push(Effect::SetLoadMoreVisible(false));
                    return effects;
                }

                let has_more =
                    page.next_continuation_token.is_some() && page.articles.len() >= self.page_size;
                self.state = self
                    .state
                    .loaded(page.next_continuation_token, has_more, page.total_results_approx);
                let batch = sort_by_date(&page.articles, self.state.sort);
                self.store.append(page.articles);

                effects.push(Effect::SetResultsLabel(self.results_label()));
                effects.push(Effect::AppendArticles(visible(batch)));
                effects.push(Effect::SetLoadMoreVisible(has_more));
                if first_page {
                    effects.push(Effect::ScrollToTop);
                }
            }
            Err(err) => {
                let message = match err.to_string() {
                    m if m.trim().is_empty() => GENERIC_ERROR.to_string(),
                    m => m,
                };
                let retryable = err.is_retryable();
                self.state = self.state.failed(message.clone(), retryable);
                effects.push(Effect::ShowError { message, retryable });
                effects.push(Effect::ShowNoResults(false));
                effects.push(Effect::SetLoadMoreVisible(false));
            }
        }
        effects
    }

    fn start_fetch(&self) -> Vec<Effect> {
        let Some(query) = self.state.request_query() else {
            return Vec::new();
        };
        vec![
            Effect::HideError,
            Effect::ShowLoading(true),
            Effect::Fetch(FetchRequest {
                generation: self.state.generation,
                cursor: self.state.cursor,
                query,
                page_size: self.page_size,
            }),
        ]
    }

    fn results_label(&self) -> String {
        results_label(self.state.query.as_ref(), self.state.total_results_approx)
    }
}

/// Heading above the grid, e.g. `Top headlines (20)` or `"rust" — 12 results`.
pub fn results_label(query: Option<&QuerySpec>, total: usize) -> String {
    match query {
        Some(QuerySpec::Search { term, .. }) if total > 0 => format!("\"{}\" — {} results", term, total),
        Some(QuerySpec::Search { .. }) => "Search results".to_string(),
        Some(QuerySpec::Headlines { category: Some(category), .. }) => {
            let mut chars = category.chars();
            let label = match chars.next() {
                Some(first) => format!("{}{} news", first.to_uppercase(), chars.as_str()),
                None => "Top headlines".to_string(),
            };
            with_total(label, total)
        }
        _ => with_total("Top headlines".to_string(), total),
    }
}

fn with_total(label: String, total: usize) -> String {
    if total > 0 {
        format!("{} ({})", label, total)
    } else {
        label
    }
}

fn visible(articles: Vec<Article>) -> Vec<Article> {
    articles.into_iter().filter(|a| !a.is_placeholder()).collect()
}
