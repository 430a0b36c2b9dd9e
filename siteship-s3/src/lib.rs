//! # siteship-s3
//!
//! [`StorageBackend`] over an S3 bucket (or any S3-compatible store).
//!
//! The SDK is async; [`S3Backend`] owns a current-thread tokio runtime and
//! blocks on each call, so requests are issued strictly one at a time.

use aws_sdk_s3::config::{Credentials as AwsCredentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::Object;
use aws_sdk_s3::Client;
use thiserror::Error;
use tokio::runtime::Runtime;

use siteship_core::{Credentials, DeployConfig, ObjectHandle, RelativeKey, RemoteObject};
use siteship_sync::{BackendError, Operation, StorageBackend};

/// Errors raised while constructing an [`S3Backend`].
#[derive(Debug, Error)]
pub enum S3SetupError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Bucket-backed storage.
pub struct S3Backend {
    client: Client,
    bucket: String,
    runtime: Runtime,
}

impl S3Backend {
    /// Build a client for `config.bucket` using the given static credentials.
    ///
    /// No request is made here; the first network call is the listing.
    pub fn new(config: &DeployConfig, credentials: &Credentials) -> Result<Self, S3SetupError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let aws_credentials = AwsCredentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "siteship",
        );
        let region = Region::new(config.region.clone());
        let endpoint_url = config.endpoint_url.clone();

        let client = runtime.block_on(async move {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(region)
                .credentials_provider(aws_credentials);
            if let Some(endpoint) = endpoint_url.as_ref() {
                loader = loader.endpoint_url(endpoint.clone());
            }
            let shared = loader.load().await;
            let s3_config = aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(endpoint_url.is_some())
                .build();
            Client::from_conf(s3_config)
        });

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            runtime,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl StorageBackend for S3Backend {
    fn list(&self) -> Result<Vec<RemoteObject>, BackendError> {
        self.runtime.block_on(async {
            let mut objects = Vec::new();
            let mut token: Option<String> = None;
            loop {
                let page = self
                    .client
                    .list_objects_v2()
                    .bucket(&self.bucket)
                    .set_continuation_token(token.take())
                    .send()
                    .await
                    .map_err(|e| request_err(Operation::List, &self.bucket, e))?;

                for object in page.contents() {
                    objects.push(remote_object(object)?);
                }

                match page.next_continuation_token() {
                    Some(next) if page.is_truncated().unwrap_or(false) => {
                        token = Some(next.to_owned());
                    }
                    _ => break,
                }
            }
            tracing::debug!("listed {} objects in {}", objects.len(), self.bucket);
            Ok::<_, BackendError>(objects)
        })
    }

    fn read(&self, key: &RelativeKey) -> Result<Vec<u8>, BackendError> {
        self.runtime.block_on(async {
            let out = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key.as_str())
                .send()
                .await
                .map_err(|e| {
                    if e.as_service_error().is_some_and(|s| s.is_no_such_key()) {
                        BackendError::NotFound {
                            key: key.to_string(),
                        }
                    } else {
                        request_err(Operation::Read, key.as_str(), e)
                    }
                })?;
            let bytes = out
                .body
                .collect()
                .await
                .map_err(|e| request_err(Operation::Read, key.as_str(), e))?;
            Ok::<_, BackendError>(bytes.into_bytes().to_vec())
        })
    }

    fn put(&mut self, key: &RelativeKey, content: Vec<u8>) -> Result<(), BackendError> {
        let size = content.len();
        self.runtime.block_on(async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key.as_str())
                .content_type(content_type_for(key.as_str()))
                .body(ByteStream::from(content))
                .send()
                .await
                .map_err(|e| request_err(Operation::Put, key.as_str(), e))
        })?;
        tracing::debug!("put {size} bytes to s3://{}/{key}", self.bucket);
        Ok(())
    }

    fn delete(&mut self, handle: &ObjectHandle) -> Result<(), BackendError> {
        self.runtime.block_on(async {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&handle.0)
                .send()
                .await
                .map_err(|e| request_err(Operation::Delete, &handle.0, e))
        })?;
        tracing::debug!("deleted s3://{}/{}", self.bucket, handle.0);
        Ok(())
    }
}

fn request_err<E>(operation: Operation, key: &str, err: E) -> BackendError
where
    E: std::error::Error,
{
    BackendError::Request {
        operation,
        key: key.to_owned(),
        message: DisplayErrorContext(err).to_string(),
    }
}

/// Validate one listing entry into a [`RemoteObject`].
fn remote_object(object: &Object) -> Result<RemoteObject, BackendError> {
    to_remote_object(object.key(), object.e_tag())
}

fn to_remote_object(key: Option<&str>, e_tag: Option<&str>) -> Result<RemoteObject, BackendError> {
    let key = key.ok_or_else(|| BackendError::InvalidObject {
        reason: "listing entry without a key".to_owned(),
    })?;
    let e_tag = e_tag.ok_or_else(|| BackendError::InvalidObject {
        reason: format!("object '{key}' has no ETag"),
    })?;
    Ok(RemoteObject::new(
        RelativeKey::from(key),
        e_tag,
        ObjectHandle(key.to_owned()),
    ))
}

/// Content type served by the website endpoint for `key`.
fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_normalized_at_the_boundary() {
        let obj = to_remote_object(Some("blog/index.html"), Some("\"abc123\"")).unwrap();
        assert_eq!(obj.key.as_str(), "blog/index.html");
        assert_eq!(obj.fingerprint.as_str(), "abc123");
        assert_eq!(obj.handle, ObjectHandle("blog/index.html".to_string()));
    }

    #[test]
    fn entry_without_etag_is_rejected() {
        let err = to_remote_object(Some("a.html"), None).unwrap_err();
        assert!(matches!(err, BackendError::InvalidObject { .. }), "got: {err}");
    }

    #[test]
    fn entry_without_key_is_rejected() {
        let err = to_remote_object(None, Some("\"abc\"")).unwrap_err();
        assert!(matches!(err, BackendError::InvalidObject { .. }), "got: {err}");
    }

    #[test]
    fn sdk_object_converts() {
        let object = Object::builder().key("a.css").e_tag("\"ff\"").build();
        let remote = remote_object(&object).unwrap();
        assert_eq!(remote.fingerprint.as_str(), "ff");
    }

    #[test]
    fn content_types_for_site_assets() {
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("css/Site.CSS"), "text/css; charset=utf-8");
        assert_eq!(content_type_for("img/logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("CNAME"), "application/octet-stream");
    }

    #[test]
    fn backend_builds_without_network() {
        let config = DeployConfig {
            endpoint_url: Some("http://127.0.0.1:9".to_string()),
            ..DeployConfig::default()
        };
        let backend = S3Backend::new(&config, &Credentials::new("id", "secret")).unwrap();
        assert_eq!(backend.bucket(), "curiousskeptic.com");
    }
}
