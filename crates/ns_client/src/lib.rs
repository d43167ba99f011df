pub mod api;
pub mod app;
pub mod controller;
pub mod error;
pub mod format;
pub mod render;
pub mod result_store;
pub mod session;
pub mod trending;

pub use api::{HttpNewsApi, NewsApi};
pub use app::NewsClient;
pub use controller::{Controller, Effect, Event, FetchRequest, DEFAULT_PAGE_SIZE};
pub use error::FetchError;
pub use render::{escape_html, render_card, Node};
pub use result_store::{ResultStore, SortOrder};
pub use session::{Phase, SessionState};
pub use trending::TrendingPanel;

pub mod prelude {
    pub use crate::api::{HttpNewsApi, NewsApi};
    pub use crate::app::NewsClient;
    pub use crate::controller::{Controller, Effect, Event};
    pub use crate::error::FetchError;
    pub use crate::result_store::SortOrder;
}
