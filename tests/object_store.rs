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

use std::sync::Arc;

use maplit::btreemap;
#[cfg(feature = "store-s3")]
use serial_test::serial;

use common::*;
use shell_store::store::{
    create_bucket_if_not_exists, delete_bucket_if_exists, wipe_bucket, MemoryConfig, MemoryStore,
    ObjectMetadata, ObjectStore, OpenStore, VersionListing,
};
use shell_store::{Error, NamingRule};

mod common;

// Tests which use S3 are forced to run in sequence with `serial_test` because they share a
// service. That crate doesn't support test functions which return a `Result`, so those tests
// return `()` and unwrap instead.

fn metadata() -> ObjectMetadata {
    btreemap! {
        String::from("identifier") => String::from("SM-001"),
        String::from("idShort") => String::from("sm1"),
    }
}

/// Collect every page of the version listing of `bucket`.
fn all_versions(store: &dyn ObjectStore, bucket: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut versions = Vec::new();
    let mut marker = None;
    while let Some(VersionListing { versions: page, next }) =
        store.list_versions(bucket, marker.as_ref())?
    {
        versions.extend(page.into_iter().map(|version| (version.key, version.version_id)));
        match next {
            Some(next) => marker = Some(next),
            None => break,
        }
    }
    Ok(versions)
}

fn object_round_trip(store: &dyn ObjectStore, bucket: &str) -> anyhow::Result<()> {
    create_bucket_if_not_exists(store, bucket)?;
    store.put_object(bucket, "SM-001", b"{}", &metadata())?;

    assert_that!(store.get_object(bucket, "SM-001")?).is_equal_to(b"{}".to_vec());
    let stored = store.head_object(bucket, "SM-001")?;
    assert_that!(stored.get("identifier").map(String::as_str)).is_equal_to(Some("SM-001"));
    assert_that!(store.list_keys(bucket)?).is_equal_to(vec![String::from("SM-001")]);
    assert_that!(store.get_object(bucket, "SM-002")).is_err_variant(Error::NotFound(String::new()));

    Ok(())
}

fn wiped_bucket_can_be_deleted(store: &dyn ObjectStore, bucket: &str) -> anyhow::Result<()> {
    create_bucket_if_not_exists(store, bucket)?;
    store.put_object(bucket, "first", b"1", &metadata())?;
    store.put_object(bucket, "first", b"2", &metadata())?;
    store.put_object(bucket, "second", b"3", &metadata())?;
    store.delete_object(bucket, "second")?;

    wipe_bucket(store, bucket)?;

    assert_that!(store.list_keys(bucket)?).is_empty();
    assert_that!(all_versions(store, bucket)?).is_empty();
    store.delete_bucket(bucket)?;
    assert_that!(store.bucket_exists(bucket)?).is_false();

    Ok(())
}

#[rstest]
fn memory_object_round_trip(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    object_round_trip(memory_store.as_ref(), "objects")
}

#[rstest]
fn memory_wiped_bucket_can_be_deleted(paged_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    wiped_bucket_can_be_deleted(paged_store.as_ref(), "objects")
}

#[rstest]
fn created_buckets_are_versioned(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    create_bucket_if_not_exists(memory_store.as_ref(), "objects")?;
    assert_that!(memory_store.is_versioned("objects")?).is_true();

    memory_store.create_unversioned_bucket("plain");
    assert_that!(memory_store.is_versioned("plain")?).is_false();
    assert_that!(memory_store.list_versions("plain", None)?).is_none();

    Ok(())
}

#[rstest]
fn existing_buckets_are_reused(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    memory_store.create_unversioned_bucket("plain");
    memory_store.put_object("plain", "key", b"data", &metadata())?;

    create_bucket_if_not_exists(memory_store.as_ref(), "plain")?;

    assert_that!(memory_store.is_versioned("plain")?).is_false();
    assert_that!(memory_store.list_keys("plain")?).has_length(1);

    Ok(())
}

#[rstest]
fn invalid_bucket_names_are_not_created(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    assert_that!(create_bucket_if_not_exists(memory_store.as_ref(), "Objects"))
        .is_naming_violation(NamingRule::Charset(vec!['O']));
    assert_that!(memory_store.bucket_exists("Objects")?).is_false();

    Ok(())
}

#[rstest]
fn deleting_from_versioned_bucket_leaves_marker(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    create_bucket_if_not_exists(memory_store.as_ref(), "objects")?;
    memory_store.put_object("objects", "key", b"data", &metadata())?;
    memory_store.delete_object("objects", "key")?;

    assert_that!(memory_store.list_keys("objects")?).is_empty();
    assert_that!(memory_store.head_object("objects", "key"))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(all_versions(memory_store.as_ref(), "objects")?).has_length(2);

    Ok(())
}

#[rstest]
fn version_listing_is_paged(paged_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    create_bucket_if_not_exists(paged_store.as_ref(), "objects")?;
    for body in &[b"1", b"2", b"3"] {
        paged_store.put_object("objects", "a", *body, &metadata())?;
    }
    paged_store.put_object("objects", "b", b"4", &metadata())?;
    paged_store.put_object("objects", "c", b"5", &metadata())?;

    let first = paged_store.list_versions("objects", None)?.unwrap();
    assert_that!(first.versions).has_length(2);
    assert_that!(first.next).is_some();

    let versions = all_versions(paged_store.as_ref(), "objects")?;
    let keys = versions.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
    assert_that!(keys).is_equal_to(vec!["a", "a", "a", "b", "c"]);

    Ok(())
}

#[rstest]
fn non_empty_buckets_are_not_deleted(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    create_bucket_if_not_exists(memory_store.as_ref(), "objects")?;
    memory_store.put_object("objects", "key", b"data", &metadata())?;

    assert_that!(memory_store.delete_bucket("objects"))
        .is_err_variant(Error::StoreUnavailable(anyhow::anyhow!("")));

    delete_bucket_if_exists(memory_store.as_ref(), "objects")?;
    assert_that!(memory_store.bucket_exists("objects")?).is_false();

    Ok(())
}

#[rstest]
fn missing_buckets_are_not_found(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    assert_that!(memory_store.put_object("missing", "key", b"data", &metadata()))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(memory_store.list_keys("missing")).is_err_variant(Error::NotFound(String::new()));
    assert_that!(memory_store.delete_object("missing", "key"))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(memory_store.delete_version("missing", "key", "version"))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(memory_store.bucket_exists("missing")?).is_false();
    delete_bucket_if_exists(memory_store.as_ref(), "missing")?;

    Ok(())
}

#[test]
fn zero_page_size_is_rejected() {
    assert_that!(MemoryConfig { page_size: 0 }.open()).is_err_variant(Error::Config(String::new()));
}

#[test]
#[serial(s3)]
#[cfg(feature = "store-s3")]
fn s3_object_round_trip() {
    let store = s3_store().unwrap();
    let guard = BucketGuard {
        store: &store,
        bucket: unique_bucket("objects"),
    };
    object_round_trip(guard.store, &guard.bucket).unwrap();
}

#[test]
#[serial(s3)]
#[cfg(feature = "store-s3")]
fn s3_wiped_bucket_can_be_deleted() {
    let store = s3_store().unwrap();
    let guard = BucketGuard {
        store: &store,
        bucket: unique_bucket("objects"),
    };
    wiped_bucket_can_be_deleted(guard.store, &guard.bucket).unwrap();
}
