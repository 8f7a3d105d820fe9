pub mod market_data;

pub use market_data::{BINANCE_BASE_URL, BinancePriceSource};
