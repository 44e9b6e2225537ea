//! Data acquisition and storage

pub mod download;
pub mod provider;
pub mod store;
pub mod synthetic;
pub mod yahoo;

pub use download::{download_symbols, DownloadSummary};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, RawBar, StdoutProgress,
};
pub use store::{CsvStore, StoreMeta};
pub use synthetic::generate_bars;
pub use yahoo::YahooProvider;
