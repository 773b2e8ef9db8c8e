#![forbid(unsafe_code)]

pub mod config;
pub mod http;
pub mod repository;

pub use config::{ConfigError, StoreConfig};
pub use http::HttpDeckStore;
pub use repository::{DeckStore, InMemoryDeckStore, Storage, StoreError, StoreOp};
