//! Page controller for the nature-inspired health site: insight queries,
//! community votes, dashboard charts and scroll reveals, driven over a
//! host-provided DOM and HTTP transport.

pub mod charts;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod insight;
pub mod logging;
pub mod page;
pub mod render;
pub mod reveal;
pub mod state;
pub mod transport;
pub mod vote;

pub use error::ClientError;
pub use page::Page;
pub use state::{Config, InsightResult};
