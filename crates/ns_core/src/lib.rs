pub mod error;
pub mod provider;
pub mod types;

pub use error::{Error, Result};
pub use provider::NewsProvider;
pub use types::{
    parse_timestamp, AggregatedResult, Article, Filters, PageFetchResult, QuerySpec, LATEST_ENDPOINT,
    REMOVED_TITLE,
};
