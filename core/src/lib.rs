pub mod batch;
pub mod concurrent_map;
pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod index;
pub mod interner;
pub mod paginator;
pub mod query;
pub mod relevance;
pub mod request_queue;
pub mod server;
pub mod tokenizer;

pub type DocId = i32;

pub use config::SearchConfig;
pub use document::{Document, DocumentStatus};
pub use error::{Result, SearchError};
pub use relevance::ExecutionPolicy;
pub use server::SearchServer;
