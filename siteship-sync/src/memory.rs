//! In-process [`StorageBackend`] for tests and local experiments.
//!
//! Fingerprints are the MD5 hex digest wrapped in quotes, the way S3 reports
//! ETags for single-part uploads.

use std::cell::RefCell;
use std::collections::BTreeMap;

use siteship_core::{ContentHash, ObjectHandle, RelativeKey, RemoteObject};

use crate::backend::{BackendError, Operation, StorageBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Failure {
    operation: Operation,
    key: Option<String>,
}

/// Bucket held in a `BTreeMap`, with transfer counters and failure injection.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    objects: BTreeMap<String, Vec<u8>>,
    raw_fingerprints: BTreeMap<String, String>,
    puts: usize,
    deletes: usize,
    failure: RefCell<Option<Failure>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryBackend::insert`].
    pub fn with_object(mut self, key: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(key, content);
        self
    }

    /// Seed an object without counting it as a transfer.
    pub fn insert(&mut self, key: &str, content: impl Into<Vec<u8>>) {
        self.raw_fingerprints.remove(key);
        self.objects.insert(key.to_owned(), content.into());
    }

    /// Report `raw` verbatim as the fingerprint of `key` until it is next written.
    pub fn set_raw_fingerprint(&mut self, key: &str, raw: impl Into<String>) {
        self.raw_fingerprints.insert(key.to_owned(), raw.into());
    }

    /// Make the next `operation` fail, optionally only for `key`.
    ///
    /// The failure is one-shot: it is cleared once triggered.
    pub fn fail_on(&mut self, operation: Operation, key: Option<&str>) {
        self.failure.replace(Some(Failure {
            operation,
            key: key.map(str::to_owned),
        }));
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.objects.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of successful puts since creation or the last reset.
    pub fn puts(&self) -> usize {
        self.puts
    }

    /// Number of objects removed since creation or the last reset.
    ///
    /// Deleting an absent key succeeds but is not counted.
    pub fn deletes(&self) -> usize {
        self.deletes
    }

    pub fn reset_counters(&mut self) {
        self.puts = 0;
        self.deletes = 0;
    }

    fn check_failure(&self, operation: Operation, key: &str) -> Result<(), BackendError> {
        let hit = match &*self.failure.borrow() {
            Some(f) => f.operation == operation && f.key.as_deref().map_or(true, |k| k == key),
            None => false,
        };
        if hit {
            self.failure.replace(None);
            return Err(BackendError::Request {
                operation,
                key: key.to_owned(),
                message: "injected failure".to_owned(),
            });
        }
        Ok(())
    }

    fn fingerprint_for(&self, key: &str, content: &[u8]) -> String {
        match self.raw_fingerprints.get(key) {
            Some(raw) => raw.clone(),
            None => format!("\"{}\"", ContentHash::of(content)),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn list(&self) -> Result<Vec<RemoteObject>, BackendError> {
        self.check_failure(Operation::List, "")?;
        Ok(self
            .objects
            .iter()
            .map(|(key, content)| {
                RemoteObject::new(
                    RelativeKey::from(key.as_str()),
                    &self.fingerprint_for(key, content),
                    ObjectHandle(key.clone()),
                )
            })
            .collect())
    }

    fn read(&self, key: &RelativeKey) -> Result<Vec<u8>, BackendError> {
        self.objects
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                key: key.to_string(),
            })
    }

    fn put(&mut self, key: &RelativeKey, content: Vec<u8>) -> Result<(), BackendError> {
        self.check_failure(Operation::Put, key.as_str())?;
        self.raw_fingerprints.remove(key.as_str());
        self.objects.insert(key.to_string(), content);
        self.puts += 1;
        Ok(())
    }

    fn delete(&mut self, handle: &ObjectHandle) -> Result<(), BackendError> {
        self.check_failure(Operation::Delete, &handle.0)?;
        // delete-if-present, like S3 DeleteObject
        if self.objects.remove(&handle.0).is_some() {
            self.raw_fingerprints.remove(&handle.0);
            self.deletes += 1;
        }
        Ok(())
    }
}
