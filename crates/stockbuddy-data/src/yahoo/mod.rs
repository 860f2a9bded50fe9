//! Yahoo Finance data providers.

pub mod fundamentals;
pub mod gateway;
pub mod quotes;
pub mod session;

pub use fundamentals::YahooFundamentalsProvider;
pub use gateway::{GatewayConfig, YahooGateway};
pub use quotes::YahooQuoteProvider;
pub use session::YahooSession;
