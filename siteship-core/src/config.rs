//! Deploy settings and credentials.
//!
//! Everything has a fixed default; the CLI may override individual fields.
//! Credentials are never read from the environment here: callers supply a
//! lookup function and pass the resulting [`Credentials`] to the backend.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConfigError;

/// Default content directory, relative to the working directory.
pub const DEFAULT_CONTENT_DIR: &str = "compiled";
/// Default bucket name.
pub const DEFAULT_BUCKET: &str = "curiousskeptic.com";
/// Default bucket region.
pub const DEFAULT_REGION: &str = "eu-west-1";
/// Website endpoint the bucket is served from.
pub const DEFAULT_WEBSITE_ENDPOINT: &str = "s3-website-eu-west-1.amazonaws.com";

/// Variable holding the access key id.
pub const ACCESS_KEY_VAR: &str = "AMAZON_ACCESS_KEY_ID";
/// Variable holding the secret access key.
pub const SECRET_KEY_VAR: &str = "AMAZON_SECRET_ACCESS_KEY";

/// Where to read the site from and where to publish it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
    pub content_dir: PathBuf,
    pub bucket: String,
    pub region: String,
    pub website_endpoint: String,
    /// API endpoint override for S3-compatible stores.
    pub endpoint_url: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            bucket: DEFAULT_BUCKET.to_owned(),
            region: DEFAULT_REGION.to_owned(),
            website_endpoint: DEFAULT_WEBSITE_ENDPOINT.to_owned(),
            endpoint_url: None,
        }
    }
}

impl DeployConfig {
    /// Public URL of the published site.
    pub fn site_url(&self) -> String {
        format!("http://{}.{}/", self.bucket, self.website_endpoint)
    }
}

/// Static access key pair handed to the storage backend constructor.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Resolve credentials through `lookup` (e.g. `|k| std::env::var(k).ok()`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |var: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingCredential {
                    var: var.to_owned(),
                })
        };
        Ok(Self {
            access_key_id: fetch(ACCESS_KEY_VAR)?,
            secret_access_key: fetch(SECRET_KEY_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_published_site() {
        let cfg = DeployConfig::default();
        assert_eq!(cfg.content_dir, PathBuf::from("compiled"));
        assert_eq!(cfg.bucket, "curiousskeptic.com");
        assert_eq!(
            cfg.site_url(),
            "http://curiousskeptic.com.s3-website-eu-west-1.amazonaws.com/"
        );
    }

    #[test]
    fn credentials_from_lookup() {
        let vars: HashMap<&str, &str> =
            [(ACCESS_KEY_VAR, "AKIA123"), (SECRET_KEY_VAR, "s3cr3t")].into();
        let creds = Credentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(creds, Credentials::new("AKIA123", "s3cr3t"));
    }

    #[test]
    fn empty_secret_is_missing() {
        let vars: HashMap<&str, &str> = [(ACCESS_KEY_VAR, "AKIA123"), (SECRET_KEY_VAR, "  ")].into();
        let err = Credentials::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingCredential {
                var: SECRET_KEY_VAR.to_string()
            }
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", Credentials::new("AKIA123", "s3cr3t"));
        assert!(rendered.contains("AKIA123"));
        assert!(!rendered.contains("s3cr3t"));
    }
}
