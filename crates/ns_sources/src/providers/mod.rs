use std::sync::Arc;

use ns_core::{Error, NewsProvider, PageFetchResult, Result};

pub mod dummy;
pub mod newsdata;

pub use dummy::DummyProvider;
pub use newsdata::NewsDataProvider;

#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Builds the provider named on the command line. Available: newsdata (default), dummy.
pub fn create_provider(name: &str, config: ProviderConfig) -> Result<Arc<dyn NewsProvider>> {
    match name.to_lowercase().as_str() {
        "newsdata" => {
            let base_url = config.base_url.as_deref().unwrap_or(newsdata::DEFAULT_BASE_URL);
            Ok(Arc::new(NewsDataProvider::with_base_url(config.api_key, base_url)))
        }
        "dummy" => Ok(Arc::new(DummyProvider::paged(vec![
            PageFetchResult {
                articles: dummy::sample_articles("Morning Brief", 10),
                continuation_token: Some("evening".to_string()),
            },
            PageFetchResult {
                articles: dummy::sample_articles("Evening Brief", 10),
                continuation_token: None,
            },
        ]))),
        other => Err(Error::Config(format!(
            "Unknown provider: {}. Available providers: newsdata, dummy",
            other
        ))),
    }
}
