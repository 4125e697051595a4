//! Data module - CSV loading, caching and filtering

mod cache;
mod loader;
mod processor;
pub mod schema;

pub use cache::TableCache;
pub use loader::{parse_count, parse_number, DataLoader, LoaderError, TableKind};
pub use processor::{DataProcessor, ProcessorError, Selection};
