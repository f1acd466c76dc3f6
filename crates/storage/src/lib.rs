#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod sqlite;

pub use catalog::{CatalogError, QuestionCatalog};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError, StorageScope};
