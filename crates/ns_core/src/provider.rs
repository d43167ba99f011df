use async_trait::async_trait;
use crate::types::{Filters, PageFetchResult};
use crate::Result;

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Human readable provider name, used in logs
    fn name(&self) -> &str;

    /// Fetch a single page from `endpoint`. `page` is the continuation token
    /// of a previous page, or `None` for the first one.
    async fn fetch_page(&self, endpoint: &str, filters: &Filters, page: Option<&str>) -> Result<PageFetchResult>;
}
