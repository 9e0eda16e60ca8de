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

use super::bucket_name::validate_bucket_name;
use super::object_store::ObjectStore;

/// Create `bucket` with versioning enabled unless it already exists.
///
/// # Errors
/// - `Error::NamingViolation`: The bucket name is invalid.
/// - `Error::StoreUnavailable`: An error occurred with the object store.
pub fn create_bucket_if_not_exists(store: &dyn ObjectStore, bucket: &str) -> crate::Result<()> {
    validate_bucket_name(bucket)?;

    if store.bucket_exists(bucket)? {
        tracing::info!(bucket, "Using existing bucket.");
        return Ok(());
    }

    store.create_bucket(bucket)
}

/// Remove every object from `bucket`, leaving it empty.
///
/// In a versioned bucket, every version of every object is removed, including delete markers.
///
/// # Errors
/// - `Error::NotFound`: The bucket does not exist.
/// - `Error::StoreUnavailable`: An error occurred with the object store.
pub fn wipe_bucket(store: &dyn ObjectStore, bucket: &str) -> crate::Result<()> {
    if store.is_versioned(bucket)? {
        // Deleting versions shifts the listing, so always restart from the first page.
        while let Some(listing) = store.list_versions(bucket, None)? {
            if listing.versions.is_empty() {
                break;
            }
            for version in listing.versions {
                store.delete_version(bucket, &version.key, &version.version_id)?;
            }
        }
    } else {
        for key in store.list_keys(bucket)? {
            store.delete_object(bucket, &key)?;
        }
    }

    tracing::info!(bucket, "Wiped bucket.");
    Ok(())
}

/// Remove `bucket` and everything in it if it exists.
///
/// # Errors
/// - `Error::StoreUnavailable`: An error occurred with the object store.
pub fn delete_bucket_if_exists(store: &dyn ObjectStore, bucket: &str) -> crate::Result<()> {
    if !store.bucket_exists(bucket)? {
        tracing::info!(bucket, "Bucket could not be deleted since it does not exist.");
        return Ok(());
    }

    wipe_bucket(store, bucket)?;
    store.delete_bucket(bucket)
}
