use ns_core::QuerySpec;

use crate::result_store::SortOrder;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Empty,
    Error { message: String, retryable: bool },
}

/// Snapshot of the reader's session. Transitions build a new value instead of
/// mutating fields in place, so every state the controller passes through is
/// a complete, consistent record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Active query without a continuation token. `None` until the first query.
    pub query: Option<QuerySpec>,
    /// Bumped on every new query; completions from older generations are stale.
    pub generation: u64,
    /// Sequential page number of the last request, starting at 1.
    pub cursor: usize,
    /// Token that continues after the last loaded page.
    pub next_token: Option<String>,
    /// Token the last request was sent with, kept for retries.
    pub request_token: Option<String>,
    pub phase: Phase,
    pub has_more: bool,
    /// Approximate total reported by the last successful response.
    pub total_results_approx: usize,
    pub sort: SortOrder,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Fresh first page for `query`, in a new generation.
    pub fn begin_query(&self, query: QuerySpec) -> Self {
        Self {
            query: Some(query),
            generation: self.generation + 1,
            cursor: 1,
            next_token: None,
            request_token: None,
            phase: Phase::Loading,
            has_more: false,
            total_results_approx: 0,
            sort: self.sort,
        }
    }

    /// Next sequential page, continuing from the stored token.
    pub fn begin_next_page(&self) -> Self {
        Self {
            cursor: self.cursor + 1,
            request_token: self.next_token.clone(),
            phase: Phase::Loading,
            ..self.clone()
        }
    }

    /// Same cursor and token as the failed request.
    pub fn begin_retry(&self) -> Self {
        Self {
            phase: Phase::Loading,
            ..self.clone()
        }
    }

    pub fn loaded(&self, next_token: Option<String>, has_more: bool, total_results_approx: usize) -> Self {
        Self {
            next_token,
            has_more,
            total_results_approx,
            phase: Phase::Loaded,
            ..self.clone()
        }
    }

    pub fn empty(&self) -> Self {
        Self {
            next_token: None,
            has_more: false,
            total_results_approx: 0,
            phase: Phase::Empty,
            ..self.clone()
        }
    }

    pub fn failed(&self, message: String, retryable: bool) -> Self {
        Self {
            has_more: false,
            phase: Phase::Error { message, retryable },
            ..self.clone()
        }
    }

    pub fn sorted(&self, sort: SortOrder) -> Self {
        Self { sort, ..self.clone() }
    }

    /// Query to send for the current cursor.
    pub fn request_query(&self) -> Option<QuerySpec> {
        self.query
            .clone()
            .map(|query| query.with_page(self.request_token.clone()))
    }
}
