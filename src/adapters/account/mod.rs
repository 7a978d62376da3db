//! Account directory adapters.
//!
//! - `HttpAccountDirectory` - REST client for the external account service
//!
//! The in-memory variant lives in `adapters::memory`.

mod http_account_directory;

pub use http_account_directory::{AccountDirectoryConfig, HttpAccountDirectory};
