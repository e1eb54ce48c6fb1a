//! In-memory collaborators shared by the unit tests of this crate.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use futures::stream;
use lf_error::{DownloadError, LfError, Result};
use lf_traits::{ByteStream, ListPage, ObjectStore, ProcessedObjects};
use lf_types::{Entity, ObjectRef};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn cdn_entity() -> Entity {
    Entity::cdn("cf-logs", "cflogs", "EDFDVBD6EXAMPLE")
}

pub(crate) fn aged(key: &str, age: Duration, now: DateTime<Utc>) -> ObjectRef {
    ObjectRef::new(key, 64, now - age)
}

/// Object store serving fixed pages and bodies.
///
/// Continuation tokens are page indexes. Every listed key has a body unless
/// it is registered as missing or failing. Listing can be made to fail from a
/// given page on.
pub(crate) struct MockStore {
    pages: Vec<Vec<ObjectRef>>,
    bodies: HashMap<String, Vec<u8>>,
    missing: HashSet<String>,
    broken_transfer: HashSet<String>,
    rejected: HashSet<String>,
    fail_on_page: Option<usize>,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) prefixes: Mutex<Vec<String>>,
    pub(crate) fetched: Mutex<Vec<String>>,
}

impl MockStore {
    pub(crate) fn new(pages: Vec<Vec<ObjectRef>>) -> Self {
        let bodies = pages
            .iter()
            .flatten()
            .map(|o| (o.key.clone(), format!("body of {}", o.key).into_bytes()))
            .collect();

        Self {
            pages,
            bodies,
            missing: HashSet::new(),
            broken_transfer: HashSet::new(),
            rejected: HashSet::new(),
            fail_on_page: None,
            list_calls: AtomicUsize::new(0),
            prefixes: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(vec![Vec::new()])
    }

    pub(crate) fn failing_listing() -> Self {
        Self::empty().fail_on_page(0)
    }

    /// Fail the listing call for page `index` with a listing error.
    pub(crate) fn fail_on_page(mut self, index: usize) -> Self {
        self.fail_on_page = Some(index);
        self
    }

    pub(crate) fn with_body(mut self, key: &str, body: &[u8]) -> Self {
        self.bodies.insert(key.to_string(), body.to_vec());
        self
    }

    pub(crate) fn with_missing(mut self, key: &str) -> Self {
        self.missing.insert(key.to_string());
        self
    }

    pub(crate) fn with_broken_transfer(mut self, key: &str) -> Self {
        self.broken_transfer.insert(key.to_string());
        self
    }

    /// Answer requests for `key` with a configuration error.
    pub(crate) fn with_rejected(mut self, key: &str) -> Self {
        self.rejected.insert(key.to_string());
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn list_page(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.prefixes.lock().unwrap().push(prefix.to_string());

        let index: usize = continuation
            .map(|t| t.parse().unwrap())
            .unwrap_or_default();

        if self.fail_on_page == Some(index) {
            return Err(LfError::Listing("AccessDenied".to_string()));
        }
        let objects = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());

        Ok(ListPage::new(objects, next))
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<ByteStream> {
        self.fetched.lock().unwrap().push(key.to_string());

        if self.rejected.contains(key) {
            return Err(LfError::Config("invalid credentials".to_string()));
        }

        if self.missing.contains(key) {
            return Err(LfError::Download(DownloadError::Request {
                key: key.to_string(),
                message: "NoSuchKey".to_string(),
            }));
        }

        let body = self.bodies.get(key).cloned().unwrap_or_default();
        let (head, tail) = body.split_at(body.len() / 2);
        let mut chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::copy_from_slice(head)),
            Ok(Bytes::copy_from_slice(tail)),
        ];

        if self.broken_transfer.contains(key) {
            chunks[1] = Err(LfError::Download(DownloadError::Transfer {
                key: key.to_string(),
                message: "connection reset".to_string(),
            }));
        }

        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Oracle returning a fixed key list, or failing.
pub(crate) struct MockOracle {
    keys: Vec<String>,
    fail: bool,
    pub(crate) calls: AtomicUsize,
}

impl MockOracle {
    pub(crate) fn new(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            keys: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProcessedObjects for MockOracle {
    async fn processed_objects(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LfError::Oracle("state store unreachable".to_string()));
        }
        Ok(self.keys.clone())
    }
}
