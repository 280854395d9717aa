//! External collaborators supplying market data.

pub mod http_provider;
pub mod market_data;

pub use http_provider::HttpMarketDataProvider;
pub use market_data::{MarketDataProvider, ReplayMarketDataProvider};
