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

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use super::object_store::{ObjectMetadata, ObjectStore, ObjectVersion, VersionListing, VersionMarker};
use super::open_store::OpenStore;

/// The version ID S3 reports for objects in buckets without versioning.
const NULL_VERSION: &str = "null";

/// The configuration for opening a [`MemoryStore`].
///
/// [`MemoryStore`]: crate::store::MemoryStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// The maximum number of entries returned by one call to `list_versions`.
    pub page_size: usize,
}

impl MemoryConfig {
    /// Create a new `MemoryConfig` with the default page size.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig { page_size: 1000 }
    }
}

impl OpenStore for MemoryConfig {
    type Store = MemoryStore;

    fn open(&self) -> crate::Result<Self::Store> {
        if self.page_size == 0 {
            return Err(crate::Error::Config(String::from(
                "The page size must be greater than zero.",
            )));
        }
        Ok(MemoryStore {
            buckets: RwLock::new(HashMap::new()),
            next_version: AtomicU64::new(1),
            page_size: self.page_size,
        })
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    metadata: ObjectMetadata,
}

/// A version of an object, where `None` is a delete marker.
#[derive(Debug, Clone)]
struct StoredVersion {
    version_id: String,
    object: Option<StoredObject>,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    versioned: bool,
    // The newest version of each key is last.
    objects: BTreeMap<String, Vec<StoredVersion>>,
}

impl MemoryBucket {
    fn current(&self, key: &str) -> Option<&StoredObject> {
        self.objects
            .get(key)
            .and_then(|versions| versions.last())
            .and_then(|version| version.object.as_ref())
    }
}

/// An `ObjectStore` which stores objects in memory.
///
/// Unlike other `ObjectStore` implementations, data in a `MemoryStore` is not stored persistently
/// and is only accessible to the current process. This store is useful for testing.
///
/// Buckets created through [`ObjectStore::create_bucket`] are versioned, like on S3. Deleting an
/// object from a versioned bucket leaves a delete marker behind. Use
/// [`create_unversioned_bucket`] to get a bucket without versioning.
///
/// [`create_unversioned_bucket`]: crate::store::MemoryStore::create_unversioned_bucket
#[derive(Debug)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<String, MemoryBucket>>,
    next_version: AtomicU64,
    page_size: usize,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore` with the default configuration.
    pub fn new() -> Self {
        MemoryStore {
            buckets: RwLock::new(HashMap::new()),
            next_version: AtomicU64::new(1),
            page_size: MemoryConfig::default().page_size,
        }
    }

    /// Create `bucket` without enabling versioning.
    ///
    /// If the bucket already exists, this does nothing.
    pub fn create_unversioned_bucket(&self, bucket: &str) {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        buckets.entry(bucket.to_owned()).or_default();
    }

    fn new_version_id(&self) -> String {
        self.next_version.fetch_add(1, Ordering::Relaxed).to_string()
    }

    fn with_bucket<T>(&self, bucket: &str, f: impl FnOnce(&MemoryBucket) -> T) -> crate::Result<T> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        buckets
            .get(bucket)
            .map(f)
            .ok_or_else(|| crate::Error::NotFound(format!("bucket '{}'", bucket)))
    }

    fn with_bucket_mut<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut MemoryBucket) -> T,
    ) -> crate::Result<T> {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        buckets
            .get_mut(bucket)
            .map(f)
            .ok_or_else(|| crate::Error::NotFound(format!("bucket '{}'", bucket)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> crate::Result<()> {
        let version_id = self.new_version_id();
        self.with_bucket_mut(bucket, |memory_bucket| {
            let version = StoredVersion {
                version_id: if memory_bucket.versioned {
                    version_id
                } else {
                    String::from(NULL_VERSION)
                },
                object: Some(StoredObject {
                    body: body.to_vec(),
                    metadata: metadata.clone(),
                }),
            };
            let versions = memory_bucket.objects.entry(key.to_owned()).or_default();
            if !memory_bucket.versioned {
                versions.clear();
            }
            versions.push(version);
        })
    }

    fn get_object(&self, bucket: &str, key: &str) -> crate::Result<Vec<u8>> {
        self.with_bucket(bucket, |memory_bucket| {
            memory_bucket.current(key).map(|object| object.body.clone())
        })?
        .ok_or_else(|| crate::Error::NotFound(format!("object '{}' in bucket '{}'", key, bucket)))
    }

    fn head_object(&self, bucket: &str, key: &str) -> crate::Result<ObjectMetadata> {
        self.with_bucket(bucket, |memory_bucket| {
            memory_bucket.current(key).map(|object| object.metadata.clone())
        })?
        .ok_or_else(|| crate::Error::NotFound(format!("object '{}' in bucket '{}'", key, bucket)))
    }

    fn delete_object(&self, bucket: &str, key: &str) -> crate::Result<()> {
        let version_id = self.new_version_id();
        self.with_bucket_mut(bucket, |memory_bucket| {
            if memory_bucket.versioned {
                if memory_bucket.current(key).is_some() {
                    let versions = memory_bucket.objects.entry(key.to_owned()).or_default();
                    versions.push(StoredVersion {
                        version_id,
                        object: None,
                    });
                }
            } else {
                memory_bucket.objects.remove(key);
            }
        })
    }

    fn list_keys(&self, bucket: &str) -> crate::Result<Vec<String>> {
        self.with_bucket(bucket, |memory_bucket| {
            memory_bucket
                .objects
                .keys()
                .filter(|key| memory_bucket.current(key).is_some())
                .cloned()
                .collect()
        })
    }

    fn list_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> crate::Result<Option<VersionListing>> {
        let page_size = self.page_size;
        self.with_bucket(bucket, |memory_bucket| {
            if !memory_bucket.versioned {
                return None;
            }

            // S3 lists keys in order and the versions of each key from newest to oldest.
            let all_versions = memory_bucket
                .objects
                .iter()
                .flat_map(|(key, versions)| {
                    versions.iter().rev().map(move |version| ObjectVersion {
                        key: key.clone(),
                        version_id: version.version_id.clone(),
                    })
                })
                .collect::<Vec<_>>();

            let start = match marker {
                None => 0,
                Some(marker) => all_versions
                    .iter()
                    .position(|version| {
                        version.key == marker.key_marker
                            && marker
                                .version_id_marker
                                .as_ref()
                                .map_or(true, |id| id == &version.version_id)
                    })
                    .map_or(all_versions.len(), |position| position + 1),
            };

            let versions = all_versions
                .iter()
                .skip(start)
                .take(page_size)
                .cloned()
                .collect::<Vec<_>>();
            let next = if start + versions.len() < all_versions.len() {
                versions.last().map(|last| VersionMarker {
                    key_marker: last.key.clone(),
                    version_id_marker: Some(last.version_id.clone()),
                })
            } else {
                None
            };

            Some(VersionListing { versions, next })
        })
    }

    fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> crate::Result<()> {
        self.with_bucket_mut(bucket, |memory_bucket| {
            if let Some(versions) = memory_bucket.objects.get_mut(key) {
                versions.retain(|version| version.version_id != version_id);
                if versions.is_empty() {
                    memory_bucket.objects.remove(key);
                }
            }
        })
    }

    fn bucket_exists(&self, bucket: &str) -> crate::Result<bool> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(buckets.contains_key(bucket))
    }

    fn create_bucket(&self, bucket: &str) -> crate::Result<()> {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        buckets.entry(bucket.to_owned()).or_default().versioned = true;
        Ok(())
    }

    fn delete_bucket(&self, bucket: &str) -> crate::Result<()> {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        match buckets.get(bucket) {
            None => Err(crate::Error::NotFound(format!("bucket '{}'", bucket))),
            Some(memory_bucket) if !memory_bucket.objects.is_empty() => {
                Err(crate::Error::StoreUnavailable(anyhow::anyhow!(
                    "The bucket '{}' is not empty.",
                    bucket
                )))
            }
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    fn is_versioned(&self, bucket: &str) -> crate::Result<bool> {
        self.with_bucket(bucket, |memory_bucket| memory_bucket.versioned)
    }
}
