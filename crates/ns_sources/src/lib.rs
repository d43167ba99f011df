pub mod aggregator;
pub mod logging;
pub mod providers;

pub use aggregator::{dedup_by_title, Aggregator, MAX_UPSTREAM_REQUESTS};
pub use logging::{init_logging, Logger};
pub use providers::{create_provider, DummyProvider, NewsDataProvider, ProviderConfig};

pub mod prelude {
    pub use super::aggregator::Aggregator;
    pub use super::providers::create_provider;
    pub use ns_core::{AggregatedResult, Article, Error, Filters, NewsProvider, Result};
}
