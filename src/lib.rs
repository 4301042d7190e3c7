pub mod boundary;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod interaction;
pub mod message;
pub mod release;
pub mod version_store;

pub use error::{ReleaseError, Result};
