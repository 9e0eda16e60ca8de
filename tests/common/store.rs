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

use rstest::*;
use uuid::Uuid;

use shell_store::store::{MemoryConfig, MemoryStore, OpenStore};
#[cfg(feature = "store-s3")]
use shell_store::store::{delete_bucket_if_exists, S3Config, S3Credentials, S3Store, DEFAULT_REGION};

/// A bucket name which no other test uses.
pub fn unique_bucket(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

#[fixture]
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryConfig::new().open().unwrap())
}

/// A memory store which lists two object versions per page.
#[fixture]
pub fn paged_store() -> Arc<MemoryStore> {
    Arc::new(MemoryConfig { page_size: 2 }.open().unwrap())
}

/// Open the S3 store described by the `.env` file.
#[cfg(feature = "store-s3")]
pub fn s3_store() -> anyhow::Result<Arc<S3Store>> {
    let config = S3Config {
        endpoint_host: dotenv::var("S3_ENDPOINT_HOST").unwrap(),
        endpoint_port: dotenv::var("S3_ENDPOINT_PORT")
            .ok()
            .map(|port| port.parse().unwrap()),
        region: dotenv::var("S3_REGION").unwrap_or_else(|_| String::from(DEFAULT_REGION)),
        credentials: S3Credentials::from_keys(
            dotenv::var("S3_ACCESS_KEY").ok(),
            dotenv::var("S3_SECRET_KEY").ok(),
        ),
        path_style: true,
        disable_cert_checking: false,
    };
    Ok(Arc::new(config.open()?))
}

/// Remove `bucket` from `store` when dropped.
#[cfg(feature = "store-s3")]
pub struct BucketGuard<'a> {
    pub store: &'a S3Store,
    pub bucket: String,
}

#[cfg(feature = "store-s3")]
impl<'a> Drop for BucketGuard<'a> {
    fn drop(&mut self) {
        let _ = delete_bucket_if_exists(self.store, &self.bucket);
    }
}
