//! Client Storage Adapters
//!
//! Implementations of the ClientStore port for hints that must survive a
//! full-page navigation.
//!
//! - **FileClientStore** - One YAML document per namespace on disk
//! - **InMemoryClientStore** - Process memory (testing/development)

mod file_client_store;
mod in_memory_client_store;

pub use file_client_store::FileClientStore;
pub use in_memory_client_store::InMemoryClientStore;
