//! Low-level file storage primitives.

pub mod atomic_json;
pub mod secret_storage;

pub use atomic_json::AtomicJsonFile;
pub use secret_storage::{SecretStorage, SecretStorageError};
