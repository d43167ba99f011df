use async_trait::async_trait;
use ns_core::{AggregatedResult, Article, QuerySpec};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::controller::FetchRequest;
use crate::error::FetchError;

/// How many trending articles the sidebar asks the proxy for.
pub const TRENDING_PAGE_SIZE: usize = 15;

/// The proxy as seen by the reader's client.
#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<AggregatedResult, FetchError>;

    async fn trending(&self) -> Result<Vec<Article>, FetchError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct TrendingBody {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Talks to the `/api/*` routes of a running proxy.
#[derive(Debug, Clone)]
pub struct HttpNewsApi {
    client: Client,
    base_url: Url,
}

impl HttpNewsApi {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| FetchError::Network(format!("Invalid server URL {}: {}", base_url, e)))?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::Network(format!("Invalid request URL: {}", e)))
    }

    /// `/api/headlines` or `/api/search` with `page` and `pageSize`.
    pub fn request_url(&self, request: &FetchRequest) -> Result<Url, FetchError> {
        let page_size = request.page_size.to_string();
        let mut url = match &request.query {
            QuerySpec::Headlines { country, category, .. } => {
                let mut url = self.endpoint("/api/headlines")?;
                url.query_pairs_mut().append_pair("country", country);
                if let Some(category) = category {
                    url.query_pairs_mut().append_pair("category", category);
                }
                url
            }
            QuerySpec::Search { term, .. } => {
                let mut url = self.endpoint("/api/search")?;
                url.query_pairs_mut().append_pair("q", term);
                url
            }
            QuerySpec::Trending => {
                let mut url = self.endpoint("/api/trending")?;
                url.query_pairs_mut().append_pair("pageSize", &page_size);
                return Ok(url);
            }
        };
        if let Some(page) = request.query.page() {
            url.query_pairs_mut().append_pair("page", page);
        }
        url.query_pairs_mut().append_pair("pageSize", &page_size);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Failed to fetch").to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn fetch(&self, request: &FetchRequest) -> Result<AggregatedResult, FetchError> {
        let url = self.request_url(request)?;
        self.get_json(url).await
    }

    async fn trending(&self) -> Result<Vec<Article>, FetchError> {
        let request = FetchRequest {
            generation: 0,
            cursor: 1,
            query: QuerySpec::Trending,
            page_size: TRENDING_PAGE_SIZE,
        };
        let url = self.request_url(&request)?;
        let body: TrendingBody = self.get_json(url).await?;
        Ok(body.articles.into_iter().filter(|a| !a.is_placeholder()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: QuerySpec) -> FetchRequest {
        FetchRequest {
            generation: 1,
            cursor: 1,
            query,
            page_size: 50,
        }
    }

    #[test]
    fn test_headlines_url() {
        let api = HttpNewsApi::new("http://localhost:5000/").unwrap();
        let url = api
            .request_url(&request(QuerySpec::headlines("gb", Some("sports"))))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/headlines?country=gb&category=sports&pageSize=50"
        );
    }

    #[test]
    fn test_search_url_with_token() {
        let api = HttpNewsApi::new("http://localhost:5000").unwrap();
        let query = QuerySpec::search("rust & go").with_page(Some("tok 2".to_string()));
        let url = api.request_url(&request(query)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/search?q=rust+%26+go&page=tok+2&pageSize=50"
        );
    }

    #[test]
    fn test_trending_url() {
        let api = HttpNewsApi::new("http://localhost:5000").unwrap();
        let mut req = request(QuerySpec::Trending);
        req.page_size = TRENDING_PAGE_SIZE;
        assert_eq!(
            api.request_url(&req).unwrap().as_str(),
            "http://localhost:5000/api/trending?pageSize=15"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(HttpNewsApi::new("not a url"), Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let api = HttpNewsApi::new(&format!("http://127.0.0.1:{}", port)).unwrap();
        let err = api.fetch(&request(QuerySpec::headlines("us", None))).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.is_retryable());
    }
}
