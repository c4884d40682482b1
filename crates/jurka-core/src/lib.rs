//! Credential, identity and query resolution for the jurka issue-tracker CLI.

pub mod config;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod issue;
pub mod query;
pub mod secrets;
pub mod tracker;

pub use error::{CoreError, CoreResult, StoreError, TrackerError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
