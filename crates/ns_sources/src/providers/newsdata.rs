use std::fmt;

use async_trait::async_trait;
use ns_core::{Article, Error, Filters, NewsProvider, PageFetchResult, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsdata.io/api/1";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Value,
    #[serde(rename = "nextPage", default)]
    next_page: Value,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NewsDataArticle {
    link: Option<String>,
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source_name: Option<String>,
    source_id: Option<String>,
}

impl From<NewsDataArticle> for Article {
    fn from(item: NewsDataArticle) -> Self {
        let source_name = [item.source_name, item.source_id]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        Article {
            url: item.link.unwrap_or_default(),
            title: item.title.unwrap_or_default(),
            description: item.description.unwrap_or_default(),
            image_url: item.image_url.unwrap_or_default(),
            published_at: item.pub_date.filter(|d| !d.is_empty()),
            source_name,
        }
    }
}

/// Client for the NewsData.io `latest` API. The API key never leaves the server.
#[derive(Clone)]
pub struct NewsDataProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsDataProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The provider reads any `page` parameter as "not the first page", so an
    /// explicit first page is left out.
    fn build_url(&self, api_key: &str, endpoint: &str, filters: &Filters, page: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| Error::Config(format!("Invalid NewsData.io base URL {}: {}", self.base_url, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apikey", api_key);
            for (key, value) in filters.iter() {
                query.append_pair(key, value);
            }
            if let Some(page) = page.filter(|p| !p.is_empty() && *p != "1") {
                query.append_pair("page", page);
            }
        }
        Ok(url)
    }
}

impl fmt::Debug for NewsDataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsDataProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl NewsProvider for NewsDataProvider {
    fn name(&self) -> &str {
        "newsdata"
    }

    async fn fetch_page(&self, endpoint: &str, filters: &Filters, page: Option<&str>) -> Result<PageFetchResult> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::Config("NEWSDATA_API_KEY is not configured. Add it to your .env file.".to_string())
        })?;
        let url = self.build_url(api_key, endpoint, filters, page)?;
        tracing::debug!("GET {}{} page={:?}", self.base_url, endpoint, page);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Err(Error::UpstreamFormat(format!(
                "NewsData.io returned a non-JSON response (HTTP {}). Please check your API key.",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        parse_envelope(&body)
    }
}

fn parse_envelope(body: &str) -> Result<PageFetchResult> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| Error::UpstreamFormat(format!("Malformed NewsData.io response: {}", e)))?;

    if envelope.status == "error" {
        let message = envelope
            .results
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(envelope.message)
            .unwrap_or_else(|| "NewsData API error".to_string());
        let code = envelope.results.get("code").and_then(Value::as_str).map(str::to_string);
        return Err(Error::UpstreamApi { code, message });
    }

    let articles = match envelope.results {
        Value::Null => Vec::new(),
        results @ Value::Array(_) => serde_json::from_value::<Vec<NewsDataArticle>>(results)
            .map_err(|e| Error::UpstreamFormat(format!("Malformed NewsData.io article: {}", e)))?
            .into_iter()
            .map(Article::from)
            .collect(),
        _ => {
            return Err(Error::UpstreamFormat(
                "NewsData.io response has no result list".to_string(),
            ))
        }
    };

    let continuation_token = match envelope.next_page {
        Value::String(token) if !token.is_empty() => Some(token),
        Value::Number(token) => Some(token.to_string()),
        _ => None,
    };

    Ok(PageFetchResult {
        articles,
        continuation_token,
    })
}
