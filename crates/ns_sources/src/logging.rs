use std::collections::VecDeque;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Prefixes every message with the scope it was created for, e.g.
/// `[newsdata/latest] call 2: 10 fetched`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push_back(prefix.into());
        self
    }

    fn line(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.line(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.line(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.line(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.line(message));
    }
}

/// Installs the global subscriber once. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
            tracing_subscriber::fmt().with_env_filter(filter).init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_are_joined_in_order() {
        let logger = Logger::new().with_prefix("[newsdata]").with_prefix("[/latest]");
        assert_eq!(logger.line("call 1"), "[newsdata] [/latest] call 1");
        assert_eq!(Logger::new().line("plain"), "plain");
    }
}
