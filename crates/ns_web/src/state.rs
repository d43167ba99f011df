use std::path::PathBuf;
use std::sync::Arc;

use ns_core::NewsProvider;
use ns_sources::Aggregator;

pub struct AppState {
    pub aggregator: Aggregator,
    /// Directory with the static front end, if it should be served.
    pub public_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(provider: Arc<dyn NewsProvider>) -> Self {
        Self {
            aggregator: Aggregator::new(provider),
            public_dir: None,
        }
    }

    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = Some(dir.into());
        self
    }
}
