use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ns_core::{Article, Error, Filters, NewsProvider, PageFetchResult, Result};

/// A request the dummy provider received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub filters: Filters,
    pub page: Option<String>,
}

enum Script {
    Pages(VecDeque<Result<PageFetchResult>>),
    Endless { batch_size: usize },
    Book(Vec<PageFetchResult>),
}

/// Offline provider serving scripted pages. Used by tests and the `--provider dummy` mode.
pub struct DummyProvider {
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl DummyProvider {
    /// Serves `pages` in order, then an empty final page.
    pub fn with_pages(pages: Vec<PageFetchResult>) -> Self {
        Self::with_responses(pages.into_iter().map(Ok).collect())
    }

    pub fn with_responses(responses: Vec<Result<PageFetchResult>>) -> Self {
        Self {
            script: Mutex::new(Script::Pages(responses.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Never runs out: every call returns `batch_size` fresh articles and a token.
    pub fn endless(batch_size: usize) -> Self {
        Self {
            script: Mutex::new(Script::Endless { batch_size }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves `pages` as a fixed book: no token reads the first page, a token
    /// reads the page after the one that issued it. Nothing is consumed, so
    /// every request can page through the book again.
    pub fn paged(pages: Vec<PageFetchResult>) -> Self {
        Self {
            script: Mutex::new(Script::Book(pages)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: Error) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

/// `count` articles titled `"{prefix} {n}"` with distinct URLs and hourly timestamps.
pub fn sample_articles(prefix: &str, count: usize) -> Vec<Article> {
    (0..count)
        .map(|i| Article {
            url: format!("https://dummy.test/{}/{}", prefix.to_lowercase().replace(' ', "-"), i),
            title: format!("{} {}", prefix, i),
            description: format!("Sample story {} from the {} feed", i, prefix),
            image_url: String::new(),
            published_at: Some(format!("2024-05-01 {:02}:00:00", i % 24)),
            source_name: "Dummy Wire".to_string(),
        })
        .collect()
}

fn book_page(pages: &[PageFetchResult], token: Option<&str>) -> PageFetchResult {
    let index = match token {
        None => Some(0),
        Some(token) => pages
            .iter()
            .position(|p| p.continuation_token.as_deref() == Some(token))
            .map(|issuer| issuer + 1),
    };
    index
        .and_then(|i| pages.get(i))
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl NewsProvider for DummyProvider {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn fetch_page(&self, endpoint: &str, filters: &Filters, page: Option<&str>) -> Result<PageFetchResult> {
        let call_index = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| Error::Storage("dummy provider call log poisoned".to_string()))?;
            calls.push(RecordedCall {
                endpoint: endpoint.to_string(),
                filters: filters.clone(),
                page: page.map(str::to_string),
            });
            calls.len()
        };

        let mut script = self
            .script
            .lock()
            .map_err(|_| Error::Storage("dummy provider script poisoned".to_string()))?;
        match &mut *script {
            Script::Pages(pages) => pages.pop_front().unwrap_or_else(|| Ok(PageFetchResult::default())),
            Script::Endless { batch_size } => Ok(PageFetchResult {
                articles: sample_articles(&format!("Page {}", call_index), *batch_size),
                continuation_token: Some(format!("token-{}", call_index)),
            }),
            Script::Book(pages) => Ok(book_page(pages, page)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_are_served_in_order() {
        let provider = DummyProvider::with_pages(vec![
            PageFetchResult { articles: sample_articles("A", 2), continuation_token: Some("next".to_string()) },
            PageFetchResult { articles: sample_articles("B", 1), continuation_token: None },
        ]);
        let filters = Filters::new().with("q", "rust");

        let first = provider.fetch_page("/latest", &filters, None).await.unwrap();
        assert_eq!(first.articles.len(), 2);
        let second = provider.fetch_page("/latest", &filters, Some("next")).await.unwrap();
        assert_eq!(second.articles[0].title, "B 0");
        let third = provider.fetch_page("/latest", &filters, None).await.unwrap();
        assert!(third.articles.is_empty() && third.continuation_token.is_none());

        let calls = provider.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].page.as_deref(), Some("next"));
        assert_eq!(calls[0].filters.get("q"), Some("rust"));
    }

    #[tokio::test]
    async fn test_book_can_be_read_repeatedly() {
        let provider = DummyProvider::paged(vec![
            PageFetchResult { articles: sample_articles("A", 2), continuation_token: Some("b".to_string()) },
            PageFetchResult { articles: sample_articles("B", 3), continuation_token: None },
        ]);

        for _ in 0..2 {
            let first = provider.fetch_page("/latest", &Filters::new(), None).await.unwrap();
            assert_eq!(first.articles[0].title, "A 0");
            let second = provider.fetch_page("/latest", &Filters::new(), Some("b")).await.unwrap();
            assert_eq!(second.articles.len(), 3);
            assert!(second.continuation_token.is_none());
        }

        let unknown = provider.fetch_page("/latest", &Filters::new(), Some("nope")).await.unwrap();
        assert!(unknown.articles.is_empty() && unknown.continuation_token.is_none());
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn test_endless_never_exhausts() {
        let provider = DummyProvider::endless(3);
        for _ in 0..4 {
            let page = provider.fetch_page("/latest", &Filters::new(), None).await.unwrap();
            assert_eq!(page.articles.len(), 3);
            assert!(page.continuation_token.is_some());
        }
        assert_eq!(provider.call_count(), 4);
    }
}
