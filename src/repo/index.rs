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

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::store::ObjectStore;

use super::codec::{metadata_value, IDENTIFIER_TAG, ID_SHORT_TAG};

/// Find the identifier of the document in `bucket` whose short name is `short_name`.
///
/// The object store has no secondary indices, so this reads the metadata of every object in the
/// bucket until it finds a match. Bodies are never fetched. If several documents share the short
/// name, the first one in listing order wins.
///
/// This returns `Ok(None)` if no document has the short name.
///
/// # Errors
/// - `Error::NotFound`: The bucket does not exist.
/// - `Error::StoreUnavailable`: An error occurred with the object store.
pub fn resolve_short_name(
    store: &dyn ObjectStore,
    bucket: &str,
    short_name: &str,
) -> crate::Result<Option<String>> {
    for key in store.list_keys(bucket)? {
        let metadata = match store.head_object(bucket, &key) {
            Ok(metadata) => metadata,
            // Removed since it was listed.
            Err(crate::Error::NotFound(_)) => continue,
            Err(error) => return Err(error),
        };
        if metadata_value(&metadata, ID_SHORT_TAG) == Some(short_name) {
            let identifier = metadata_value(&metadata, IDENTIFIER_TAG).unwrap_or(&key);
            tracing::debug!(bucket, short_name, identifier, "Resolved short name by scan.");
            return Ok(Some(identifier.to_owned()));
        }
    }

    tracing::debug!(bucket, short_name, "No document has this short name.");
    Ok(None)
}

/// A cache of short names to identifiers for the documents in one bucket.
///
/// Writes through the repositories keep the cache current. A lookup which misses the cache falls
/// back to [`resolve_short_name`] and remembers the answer. A cached entry is checked against the
/// object's metadata before it is returned, so an entry made stale by another process is dropped
/// and the bucket is scanned again.
#[derive(Debug, Default)]
pub struct ShortNameIndex {
    entries: RwLock<HashMap<String, String>>,
}

impl ShortNameIndex {
    /// Create an empty `ShortNameIndex`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the document `identifier` now has the short name `short_name`.
    ///
    /// Any other short name cached for `identifier` is forgotten. If another document already
    /// holds `short_name`, neither is cached, and the next lookup scans the bucket so the first
    /// document in listing order wins.
    pub fn insert(&self, short_name: &str, identifier: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, cached| cached != identifier);
        match entries.entry(short_name.to_owned()) {
            Entry::Occupied(entry) => {
                tracing::debug!(
                    short_name,
                    identifier,
                    other = %entry.get(),
                    "Short name is shared; dropping index entry."
                );
                entry.remove();
            }
            Entry::Vacant(entry) => {
                entry.insert(identifier.to_owned());
            }
        }
    }

    /// Record that the document `identifier` has the short name `short_name`, unless another
    /// document already holds it.
    ///
    /// This is for filling the cache in listing order, where the first holder wins.
    pub fn insert_first(&self, short_name: &str, identifier: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(short_name.to_owned())
            .or_insert_with(|| identifier.to_owned());
    }

    /// Forget every short name cached for the document `identifier`.
    pub fn remove_identifier(&self, identifier: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, cached| cached != identifier);
    }

    /// Forget every cached entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    /// The identifier cached for `short_name`, without checking the store.
    pub fn cached(&self, short_name: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(short_name).cloned()
    }

    /// Find the identifier of the document in `bucket` whose short name is `short_name`.
    ///
    /// # Errors
    /// - `Error::NotFound`: The bucket does not exist.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn resolve(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        short_name: &str,
    ) -> crate::Result<Option<String>> {
        if let Some(identifier) = self.cached(short_name) {
            match store.head_object(bucket, &identifier) {
                Ok(metadata) if metadata_value(&metadata, ID_SHORT_TAG) == Some(short_name) => {
                    return Ok(Some(identifier));
                }
                Ok(_) | Err(crate::Error::NotFound(_)) => {
                    tracing::debug!(short_name, identifier = %identifier, "Dropping stale index entry.");
                    self.remove_identifier(&identifier);
                }
                Err(error) => return Err(error),
            }
        }

        let resolved = resolve_short_name(store, bucket, short_name)?;
        if let Some(identifier) = &resolved {
            self.insert(short_name, identifier);
        }
        Ok(resolved)
    }
}
