use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use ns_core::{Article, Result};
use ns_storage::{KeyValueStore, SaveToggle, SavedArticles};
use tracing::{debug, info};

use crate::api::NewsApi;
use crate::controller::{Controller, Effect, Event};
use crate::render::{render_card, Node};
use crate::trending::TrendingPanel;

/// Wires the controller to a [`NewsApi`] and the reader's local storage.
pub struct NewsClient<A, S> {
    api: A,
    controller: Controller,
    saved: SavedArticles<S>,
    trending: TrendingPanel,
}

impl<A: NewsApi, S: KeyValueStore> NewsClient<A, S> {
    pub fn new(api: A, store: S, page_size: usize) -> Self {
        Self {
            api,
            controller: Controller::new(page_size),
            saved: SavedArticles::new(store),
            trending: TrendingPanel::default(),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn saved(&self) -> &SavedArticles<S> {
        &self.saved
    }

    pub fn trending(&self) -> &TrendingPanel {
        &self.trending
    }

    /// Runs `event` through the controller, performing any fetch it asks for,
    /// and returns the view effects in the order they were produced.
    pub async fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let mut pending = VecDeque::from([event]);
        let mut view = Vec::new();
        while let Some(event) = pending.pop_front() {
            for effect in self.controller.handle(event) {
                match effect {
                    Effect::Fetch(request) => {
                        debug!("Fetching page {} (generation {})", request.cursor, request.generation);
                        let result = self.api.fetch(&request).await;
                        pending.push_back(Event::FetchCompleted {
                            generation: request.generation,
                            result,
                        });
                    }
                    other => view.push(other),
                }
            }
        }
        view
    }

    pub async fn refresh_trending(&mut self) -> &TrendingPanel {
        self.trending = TrendingPanel::Loading;
        self.trending = TrendingPanel::from_result(self.api.trending().await);
        &self.trending
    }

    pub fn toggle_save(&self, article: &Article) -> Result<SaveToggle> {
        let outcome = self.saved.toggle(article)?;
        info!("{}", outcome.message());
        Ok(outcome)
    }

    /// Cards for `articles`, with save buttons matching local storage.
    pub fn render_cards(&self, articles: &[Article], now: DateTime<Utc>) -> Vec<Node> {
        let saved: HashSet<String> = self.saved.saved_urls();
        articles
            .iter()
            .map(|article| render_card(article, saved.contains(&article.url), now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::FetchRequest;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use ns_core::{AggregatedResult, QuerySpec};
    use ns_storage::MemoryStore;
    use std::sync::Mutex;

    struct ScriptedApi {
        pages: Mutex<VecDeque<std::result::Result<AggregatedResult, FetchError>>>,
        requests: Mutex<Vec<FetchRequest>>,
    }

    impl ScriptedApi {
        fn new(pages: Vec<std::result::Result<AggregatedResult, FetchError>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NewsApi for ScriptedApi {
        async fn fetch(&self, request: &FetchRequest) -> std::result::Result<AggregatedResult, FetchError> {
            self.requests.lock().unwrap().push(request.clone());
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(AggregatedResult::default()))
        }

        async fn trending(&self) -> std::result::Result<Vec<Article>, FetchError> {
            Err(FetchError::Status {
                status: 502,
                message: "down".to_string(),
            })
        }
    }

    fn batch(prefix: &str, count: usize, token: Option<&str>) -> AggregatedResult {
        let articles: Vec<Article> = (0..count)
            .map(|i| Article {
                url: format!("https://news.test/{}/{}", prefix, i),
                title: format!("{} {}", prefix, i),
                ..Default::default()
            })
            .collect();
        AggregatedResult {
            total_results_approx: articles.len(),
            articles,
            next_continuation_token: token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_fetches_through_the_controller() {
        let api = ScriptedApi::new(vec![Ok(batch("p1", 5, Some("t1"))), Ok(batch("p2", 2, None))]);
        let mut client = NewsClient::new(api, MemoryStore::new(), 5);

        let effects = client.dispatch(Event::QueryChanged(QuerySpec::headlines("us", None))).await;
        assert!(effects.contains(&Effect::SetLoadMoreVisible(true)));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Fetch(_))));

        client.dispatch(Event::LoadMoreRequested).await;
        assert_eq!(client.controller().store().len(), 7);

        let requests = client.api.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].query.page(), Some("t1"));
    }

    #[tokio::test]
    async fn test_trending_failure_leaves_grid_alone() {
        let api = ScriptedApi::new(vec![Ok(batch("p1", 3, None))]);
        let mut client = NewsClient::new(api, MemoryStore::new(), 5);
        client.dispatch(Event::QueryChanged(QuerySpec::search("rust"))).await;

        assert_eq!(client.refresh_trending().await, &TrendingPanel::Unavailable);
        assert_eq!(client.controller().store().len(), 3);
    }

    #[tokio::test]
    async fn test_save_toggle_is_reflected_in_cards() {
        let api = ScriptedApi::new(vec![Ok(batch("p1", 2, None))]);
        let mut client = NewsClient::new(api, MemoryStore::new(), 5);
        client.dispatch(Event::QueryChanged(QuerySpec::search("rust"))).await;

        let articles = client.controller().store().all().to_vec();
        assert_eq!(client.toggle_save(&articles[0]).unwrap(), SaveToggle::Saved);

        let cards = client.render_cards(&articles, Utc::now());
        assert_eq!(cards[0].find_class("btn-save").unwrap().get_attr("aria-label"), Some("Unsave"));
        assert_eq!(cards[1].find_class("btn-save").unwrap().get_attr("aria-label"), Some("Save"));

        // saving never touches the controller
        assert_eq!(client.controller().state().generation, 1);
        assert_eq!(client.toggle_save(&articles[0]).unwrap(), SaveToggle::Removed);
        assert!(client.saved().list().is_empty());
    }
}
