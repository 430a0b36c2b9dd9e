//! Domain types shared by the scanner, the reconciler and storage backends.
//!
//! Local and remote enumerations are both keyed by [`RelativeKey`]; that key is
//! the join column for the add / update / delete diff.

use std::fmt;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Path of a file relative to the content root, `/`-separated.
///
/// Doubles as the object key in the bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativeKey(pub String);

impl RelativeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RelativeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RelativeKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Lowercase hex MD5 digest of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Hash raw content.
    pub fn of(bytes: &[u8]) -> Self {
        let mut h = Md5::new();
        h.update(bytes);
        Self(hex::encode(h.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Backend-supplied content fingerprint (an entity tag), already normalized.
///
/// Backends tend to hand these back quoted and occasionally padded
/// (`"\"abc123\" "`); [`Fingerprint::normalize`] removes every `"` and trims
/// surrounding whitespace so the value compares directly against a
/// [`ContentHash`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn normalize(raw: &str) -> Self {
        Self(raw.replace('"', "").trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the remote content is considered identical to `hash`.
    pub fn matches(&self, hash: &ContentHash) -> bool {
        self.0 == hash.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque backend reference used to delete a remote object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub String);

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A file discovered under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub key: RelativeKey,
    /// Absolute (or root-joined) path used to read the content.
    pub path: PathBuf,
}

impl LocalFile {
    pub fn new(key: RelativeKey, path: impl Into<PathBuf>) -> Self {
        Self {
            key,
            path: path.into(),
        }
    }

    /// Read the file's bytes. Content is read on demand, never cached.
    pub fn read(&self) -> Result<Vec<u8>, CoreError> {
        std::fs::read(&self.path).map_err(|e| io_err(&self.path, e))
    }

    /// Read the file and return its bytes alongside their hash.
    pub fn read_hashed(&self) -> Result<(Vec<u8>, ContentHash), CoreError> {
        let bytes = self.read()?;
        let hash = ContentHash::of(&bytes);
        Ok((bytes, hash))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// An object enumerated from the storage backend.
///
/// Backends build these at their boundary; reconciliation code never sees an
/// untyped listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: RelativeKey,
    pub fingerprint: Fingerprint,
    pub handle: ObjectHandle,
}

impl RemoteObject {
    /// Build a record from a raw (unnormalized) fingerprint.
    pub fn new(key: RelativeKey, raw_fingerprint: &str, handle: ObjectHandle) -> Self {
        Self {
            key,
            fingerprint: Fingerprint::normalize(raw_fingerprint),
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_lowercase_md5_hex() {
        assert_eq!(
            ContentHash::of(b"").as_str(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            ContentHash::of(b"hello world").as_str(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn fingerprint_strips_quotes_and_whitespace() {
        let fp = Fingerprint::normalize("\"abc123\" ");
        assert_eq!(fp.as_str(), "abc123");
        assert!(fp.matches(&ContentHash("abc123".to_string())));
    }

    #[test]
    fn fingerprint_mismatch_is_not_equal() {
        let fp = Fingerprint::normalize("\"abc123\"");
        assert!(!fp.matches(&ContentHash("abc124".to_string())));
    }

    #[test]
    fn multipart_style_etag_never_matches_plain_md5() {
        let fp = Fingerprint::normalize("\"d41d8cd98f00b204e9800998ecf8427e-2\"");
        assert!(!fp.matches(&ContentHash::of(b"")));
    }

    #[test]
    fn remote_object_new_normalizes_fingerprint() {
        let obj = RemoteObject::new(
            RelativeKey::from("index.html"),
            "  \"cafebabe\"\n",
            ObjectHandle("index.html".to_string()),
        );
        assert_eq!(obj.fingerprint.as_str(), "cafebabe");
    }
}
