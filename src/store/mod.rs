//! Low-level access to object stores.
//!
//! This module provides a thin, uniform interface to S3-compatible object stores. An object store
//! only knows about buckets, keys, bodies and user metadata; it doesn't have to worry about
//! documents, indexing or version-aware deletion. Those features are implemented at a higher level
//! in [`crate::repo`].
//!
//! All object stores implement the [`ObjectStore`] trait.
//!
//! For each object store, there is a corresponding type which provides the necessary configuration
//! to open it. These config types implement [`OpenStore`].
//!
//! [`ObjectStore`]: crate::store::ObjectStore
//! [`OpenStore`]: crate::store::OpenStore

pub use self::bucket_name::{
    normalize_bucket_name, validate_bucket_name, BucketFamily, MAX_BUCKET_NAME_LENGTH,
};
pub use self::buckets::{create_bucket_if_not_exists, delete_bucket_if_exists, wipe_bucket};
pub use self::memory_store::{MemoryConfig, MemoryStore};
pub use self::object_store::{
    ObjectMetadata, ObjectStore, ObjectVersion, VersionListing, VersionMarker, CONTENT_TYPE,
};
pub use self::open_store::OpenStore;
pub use self::s3_config::{S3Config, S3Credentials, DEFAULT_REGION};
#[cfg(feature = "store-s3")]
pub use self::s3_store::S3Store;

mod bucket_name;
mod buckets;
mod memory_store;
mod object_store;
mod open_store;
mod s3_config;
mod s3_store;
