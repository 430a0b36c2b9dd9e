//! siteship core library — domain types, local tree enumeration, configuration.
//!
//! - [`types`] — keys, hashes, fingerprints, local and remote file records
//! - [`local`] — recursive content-root scan
//! - [`config`] — deploy settings and explicit credentials
//! - [`error`] — [`CoreError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod local;
pub mod types;

pub use config::{Credentials, DeployConfig};
pub use error::{ConfigError, CoreError};
pub use types::{ContentHash, Fingerprint, LocalFile, ObjectHandle, RelativeKey, RemoteObject};
