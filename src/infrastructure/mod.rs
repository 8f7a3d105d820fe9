pub mod binance;
pub mod extractor;
pub mod http_client_factory;
pub mod sample_cache;
pub mod tiingo;

pub use binance::BinancePriceSource;
pub use http_client_factory::HttpClientFactory;
pub use sample_cache::{CachePolicy, FileSampleCache};
pub use tiingo::TiingoPriceSource;
