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

use crate::store::ObjectStore;

/// Delete the document `identifier` from `bucket`.
///
/// In a bucket without versioning, this removes the object. In a versioned bucket, this walks
/// every page of the version listing and permanently removes each version of the object, so no
/// history of the document is left behind.
///
/// # Errors
/// - `Error::NotFound`: There is no document with this identifier.
/// - `Error::StoreUnavailable`: An error occurred with the object store.
pub fn delete_document(store: &dyn ObjectStore, bucket: &str, identifier: &str) -> crate::Result<()> {
    if !store.is_versioned(bucket)? {
        store.head_object(bucket, identifier)?;
        store.delete_object(bucket, identifier)?;
        tracing::info!(bucket, identifier, "Removed object.");
        return Ok(());
    }

    let mut matching = Vec::new();
    let mut marker = None;
    loop {
        let listing = match store.list_versions(bucket, marker.as_ref())? {
            Some(listing) => listing,
            None => break,
        };
        matching.extend(
            listing
                .versions
                .into_iter()
                .filter(|version| version.key == identifier),
        );
        match listing.next {
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    if matching.is_empty() {
        return Err(crate::Error::NotFound(format!(
            "object '{}' in bucket '{}'",
            identifier, bucket
        )));
    }

    // Deleting while paging would shift the listing under the markers.
    for version in &matching {
        store.delete_version(bucket, &version.key, &version.version_id)?;
        tracing::debug!(bucket, identifier, version_id = %version.version_id, "Removed object version.");
    }

    tracing::info!(bucket, identifier, versions = matching.len(), "Removed every version of object.");
    Ok(())
}
