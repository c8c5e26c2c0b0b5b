//! Infrastructure layer for cadence: storage backends, configuration
//! loading and path management.

pub mod config_service;
pub mod file_store;
pub mod memory_store;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use file_store::FileStore;
pub use memory_store::InMemoryStore;
pub use paths::CadencePaths;
pub use storage::{SecretStorage, SecretStorageError};
