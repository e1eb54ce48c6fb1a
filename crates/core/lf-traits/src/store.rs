//! Object store trait and related types.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use lf_error::Result;
use lf_types::ObjectRef;
use std::pin::Pin;

/// A stream of body chunks for one object.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// One page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Objects on this page, in the order the store returned them
    pub objects: Vec<ObjectRef>,

    /// Token for the next page; `None` on the last page
    pub next_continuation: Option<String>,
}

impl ListPage {
    /// Create a page.
    pub fn new(objects: Vec<ObjectRef>, next_continuation: Option<String>) -> Self {
        Self {
            objects,
            next_continuation,
        }
    }

    /// Whether this is the last page of the listing.
    pub fn is_last(&self) -> bool {
        self.next_continuation.is_none()
    }
}

/// Trait for object store backends.
///
/// Paging is driven by the caller: each call returns one page and the token
/// for the next, so the caller can stop as soon as it has seen enough.
///
/// # Implementations
///
/// - S3: `ListObjectsV2` and `GetObject`
/// - In-memory stores in tests
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists one page of keys under `prefix`.
    ///
    /// # Arguments
    ///
    /// * `bucket` - Bucket to list
    /// * `prefix` - Key prefix scoping the listing
    /// * `continuation` - Token from the previous page, `None` for the first
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> Result<ListPage>;

    /// Opens an object and returns its body as a stream of chunks.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ByteStream>;
}
