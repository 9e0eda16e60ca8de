/*
 * Copyright 2019-2020 Wren Powell
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use static_assertions::assert_obj_safe;

/// The media type of every object written by this crate.
pub const CONTENT_TYPE: &str = "application/json";

/// The user metadata attached to an object.
pub type ObjectMetadata = BTreeMap<String, String>;

/// One stored version of an object in a versioned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectVersion {
    /// The key of the object.
    pub key: String,

    /// The ID of this version of the object.
    pub version_id: String,
}

/// The position at which to resume listing object versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionMarker {
    /// The key to resume listing after.
    pub key_marker: String,

    /// The version of `key_marker` to resume listing after.
    pub version_id_marker: Option<String>,
}

/// One page of a listing of object versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionListing {
    /// The versions in this page, including delete markers.
    pub versions: Vec<ObjectVersion>,

    /// Where the next page starts, or `None` if this is the last page.
    pub next: Option<VersionMarker>,
}

/// A uniform interface to an object store made up of buckets of keyed objects.
///
/// An `ObjectStore` provides only the basic operations of an S3-compatible store. Serializing
/// documents, indexing and deleting them across versions are implemented at a higher level in
/// [`crate::repo`].
///
/// Every operation which fails because of the backing service returns `Error::StoreUnavailable`.
/// Implementations do not retry failed calls.
pub trait ObjectStore: fmt::Debug + Send + Sync {
    /// Write `body` as the object `key` in `bucket` along with its user `metadata`.
    ///
    /// If the object already exists, it is replaced. In a versioned bucket this adds a new version.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> crate::Result<()>;

    /// Return the body of the object `key` in `bucket`.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such object.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn get_object(&self, bucket: &str, key: &str) -> crate::Result<Vec<u8>>;

    /// Return the user metadata of the object `key` in `bucket` without fetching its body.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such object.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn head_object(&self, bucket: &str, key: &str) -> crate::Result<ObjectMetadata>;

    /// Remove the current object `key` from `bucket`.
    ///
    /// If there is no such object, this method does nothing and returns `Ok`. In a versioned bucket
    /// older versions are kept; use [`delete_version`] to remove them.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    ///
    /// [`delete_version`]: crate::store::ObjectStore::delete_version
    fn delete_object(&self, bucket: &str, key: &str) -> crate::Result<()>;

    /// Return the keys of every current object in `bucket` in the order the store lists them.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn list_keys(&self, bucket: &str) -> crate::Result<Vec<String>>;

    /// Return one page of the object versions stored in `bucket`.
    ///
    /// Listing starts after `marker`, or at the beginning if it is `None`. This returns `Ok(None)`
    /// if versioning was never enabled for `bucket`.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn list_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> crate::Result<Option<VersionListing>>;

    /// Permanently remove the version `version_id` of the object `key` from `bucket`.
    ///
    /// If there is no such version, this method does nothing and returns `Ok`.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> crate::Result<()>;

    /// Return whether `bucket` exists.
    ///
    /// # Errors
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn bucket_exists(&self, bucket: &str) -> crate::Result<bool>;

    /// Create `bucket` and enable versioning for it.
    ///
    /// If this store already owns `bucket`, versioning is enabled for it and this returns `Ok`.
    ///
    /// # Errors
    /// - `Error::StoreUnavailable`: The bucket could not be created, for example because it already
    /// exists and belongs to someone else, or another error occurred with the object store.
    fn create_bucket(&self, bucket: &str) -> crate::Result<()>;

    /// Remove `bucket`, which must be empty.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn delete_bucket(&self, bucket: &str) -> crate::Result<()>;

    /// Return whether versioning was ever enabled for `bucket`.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    fn is_versioned(&self, bucket: &str) -> crate::Result<bool>;
}

assert_obj_safe!(ObjectStore);

macro_rules! impl_object_store_for_pointer {
    ($pointer:ty) => {
        impl ObjectStore for $pointer {
            fn put_object(
                &self,
                bucket: &str,
                key: &str,
                body: &[u8],
                metadata: &ObjectMetadata,
            ) -> crate::Result<()> {
                self.as_ref().put_object(bucket, key, body, metadata)
            }

            fn get_object(&self, bucket: &str, key: &str) -> crate::Result<Vec<u8>> {
                self.as_ref().get_object(bucket, key)
            }

            fn head_object(&self, bucket: &str, key: &str) -> crate::Result<ObjectMetadata> {
                self.as_ref().head_object(bucket, key)
            }

            fn delete_object(&self, bucket: &str, key: &str) -> crate::Result<()> {
                self.as_ref().delete_object(bucket, key)
            }

            fn list_keys(&self, bucket: &str) -> crate::Result<Vec<String>> {
                self.as_ref().list_keys(bucket)
            }

            fn list_versions(
                &self,
                bucket: &str,
                marker: Option<&VersionMarker>,
            ) -> crate::Result<Option<VersionListing>> {
                self.as_ref().list_versions(bucket, marker)
            }

            fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> crate::Result<()> {
                self.as_ref().delete_version(bucket, key, version_id)
            }

            fn bucket_exists(&self, bucket: &str) -> crate::Result<bool> {
                self.as_ref().bucket_exists(bucket)
            }

            fn create_bucket(&self, bucket: &str) -> crate::Result<()> {
                self.as_ref().create_bucket(bucket)
            }

            fn delete_bucket(&self, bucket: &str) -> crate::Result<()> {
                self.as_ref().delete_bucket(bucket)
            }

            fn is_versioned(&self, bucket: &str) -> crate::Result<bool> {
                self.as_ref().is_versioned(bucket)
            }
        }
    };
}

impl_object_store_for_pointer!(Box<dyn ObjectStore>);
impl_object_store_for_pointer!(Arc<dyn ObjectStore>);
