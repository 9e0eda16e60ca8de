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

#![cfg(feature = "store-s3")]

use std::future::Future;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration,
    VersioningConfiguration,
};
use aws_sdk_s3::Client;
use secrecy::ExposeSecret;
use tokio::runtime::Runtime;

use super::object_store::{
    ObjectMetadata, ObjectStore, ObjectVersion, VersionListing, VersionMarker, CONTENT_TYPE,
};
use super::open_store::OpenStore;
use super::s3_config::{S3Config, S3Credentials, DEFAULT_REGION};

/// The error code S3 returns for operations on a bucket which does not exist.
const NO_SUCH_BUCKET: &str = "NoSuchBucket";

/// Wrap an error from the S3 client, keeping its full chain of causes in the message.
fn store_error<E: std::error::Error>(error: E) -> crate::Error {
    crate::Error::StoreUnavailable(anyhow::anyhow!("{}", DisplayErrorContext(error)))
}

fn no_such_bucket(bucket: &str) -> crate::Error {
    crate::Error::NotFound(format!("bucket '{}'", bucket))
}

fn no_such_object(bucket: &str, key: &str) -> crate::Error {
    crate::Error::NotFound(format!("object '{}' in bucket '{}'", key, bucket))
}

impl OpenStore for S3Config {
    type Store = S3Store;

    fn open(&self) -> crate::Result<Self::Store> {
        if self.disable_cert_checking {
            // The client verifies certificates with rustls and offers no switch to turn that off.
            tracing::warn!(
                endpoint = %self.endpoint_url(),
                "Certificate checking cannot be disabled; TLS certificates are still verified."
            );
        }

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(self.endpoint_url())
            .region(Region::new(self.region.clone()))
            .force_path_style(self.path_style);

        match &self.credentials {
            S3Credentials::Basic {
                access_key,
                secret_key,
            } => {
                tracing::info!("Using basic credentials (access key, secret key).");
                builder = builder.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret_key.expose_secret().clone(),
                    None,
                    None,
                    "shell-store",
                ));
            }
            S3Credentials::Anonymous => {
                tracing::info!("Using anonymous credentials.");
            }
        }

        let client = Client::from_conf(builder.build());
        tracing::info!(endpoint = %self.endpoint_url(), "Created S3 client.");
        S3Store::new(client, &self.region)
    }
}

/// An `ObjectStore` which stores objects in Amazon S3 or a compatible service.
///
/// The S3 client is asynchronous; this store owns a single-threaded Tokio runtime and blocks on
/// each request. Do not call it from inside another Tokio runtime.
///
/// You can use [`S3Config`] to open a store of this type. The `store-s3` cargo feature is required
/// to use this.
///
/// [`S3Config`]: crate::store::S3Config
#[derive(Debug)]
#[cfg_attr(docsrs, doc(cfg(feature = "store-s3")))]
pub struct S3Store {
    client: Client,
    region: String,
    runtime: Runtime,
}

impl S3Store {
    /// Create an `S3Store` which sends requests with the given `client`.
    ///
    /// The `region` decides where new buckets are created.
    ///
    /// # Errors
    /// - `Error::StoreUnavailable`: The runtime for the client could not be started.
    pub fn new(client: Client, region: &str) -> crate::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| crate::Error::StoreUnavailable(anyhow::Error::from(error)))?;
        Ok(S3Store {
            client,
            region: region.to_owned(),
            runtime,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl ObjectStore for S3Store {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        metadata: &ObjectMetadata,
    ) -> crate::Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(CONTENT_TYPE)
            .body(ByteStream::from(body.to_vec()));
        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        tracing::debug!(bucket, key, "Putting object.");
        match self.block_on(request.send()) {
            Ok(_) => Ok(()),
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => Err(no_such_bucket(bucket)),
            Err(error) => Err(store_error(error)),
        }
    }

    fn get_object(&self, bucket: &str, key: &str) -> crate::Result<Vec<u8>> {
        tracing::debug!(bucket, key, "Getting object.");
        let output = match self.block_on(self.client.get_object().bucket(bucket).key(key).send()) {
            Ok(output) => output,
            Err(error)
                if error
                    .as_service_error()
                    .map_or(false, |service_error| service_error.is_no_such_key()) =>
            {
                return Err(no_such_object(bucket, key));
            }
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => {
                return Err(no_such_bucket(bucket))
            }
            Err(error) => return Err(store_error(error)),
        };

        let data = self
            .block_on(output.body.collect())
            .map_err(store_error)?
            .into_bytes();
        Ok(data.to_vec())
    }

    fn head_object(&self, bucket: &str, key: &str) -> crate::Result<ObjectMetadata> {
        match self.block_on(self.client.head_object().bucket(bucket).key(key).send()) {
            Ok(output) => Ok(output
                .metadata()
                .map(|metadata| {
                    metadata
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default()),
            Err(error)
                if error
                    .as_service_error()
                    .map_or(false, |service_error| service_error.is_not_found()) =>
            {
                Err(no_such_object(bucket, key))
            }
            Err(error) => Err(store_error(error)),
        }
    }

    fn delete_object(&self, bucket: &str, key: &str) -> crate::Result<()> {
        tracing::debug!(bucket, key, "Deleting object.");
        match self.block_on(self.client.delete_object().bucket(bucket).key(key).send()) {
            Ok(_) => Ok(()),
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => Err(no_such_bucket(bucket)),
            Err(error) => Err(store_error(error)),
        }
    }

    fn list_keys(&self, bucket: &str) -> crate::Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.take());
            let output = match self.block_on(request.send()) {
                Ok(output) => output,
                Err(error)
                    if error
                        .as_service_error()
                        .map_or(false, |service_error| service_error.is_no_such_bucket()) =>
                {
                    return Err(no_such_bucket(bucket));
                }
                Err(error) => return Err(store_error(error)),
            };

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated() == Some(true) => {
                    continuation_token = Some(token.to_owned());
                }
                _ => break,
            }
        }

        tracing::debug!(bucket, count = keys.len(), "Listed object keys.");
        Ok(keys)
    }

    fn list_versions(
        &self,
        bucket: &str,
        marker: Option<&VersionMarker>,
    ) -> crate::Result<Option<VersionListing>> {
        if !self.is_versioned(bucket)? {
            return Ok(None);
        }

        let mut request = self.client.list_object_versions().bucket(bucket);
        if let Some(marker) = marker {
            request = request
                .key_marker(&marker.key_marker)
                .set_version_id_marker(marker.version_id_marker.clone());
        }
        let output = match self.block_on(request.send()) {
            Ok(output) => output,
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => {
                return Err(no_such_bucket(bucket))
            }
            Err(error) => return Err(store_error(error)),
        };

        let object_versions = output.versions().iter().filter_map(|version| {
            Some(ObjectVersion {
                key: version.key()?.to_owned(),
                version_id: version.version_id()?.to_owned(),
            })
        });
        let delete_markers = output.delete_markers().iter().filter_map(|marker| {
            Some(ObjectVersion {
                key: marker.key()?.to_owned(),
                version_id: marker.version_id()?.to_owned(),
            })
        });
        let versions = object_versions.chain(delete_markers).collect::<Vec<_>>();

        let next = if output.is_truncated() == Some(true) {
            output.next_key_marker().map(|key_marker| VersionMarker {
                key_marker: key_marker.to_owned(),
                version_id_marker: output.next_version_id_marker().map(str::to_owned),
            })
        } else {
            None
        };

        Ok(Some(VersionListing { versions, next }))
    }

    fn delete_version(&self, bucket: &str, key: &str, version_id: &str) -> crate::Result<()> {
        tracing::debug!(bucket, key, version_id, "Deleting object version.");
        let request = self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .version_id(version_id);
        match self.block_on(request.send()) {
            Ok(_) => Ok(()),
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => Err(no_such_bucket(bucket)),
            Err(error) => Err(store_error(error)),
        }
    }

    fn bucket_exists(&self, bucket: &str) -> crate::Result<bool> {
        match self.block_on(self.client.head_bucket().bucket(bucket).send()) {
            Ok(_) => Ok(true),
            Err(error)
                if error
                    .as_service_error()
                    .map_or(false, |service_error| service_error.is_not_found()) =>
            {
                Ok(false)
            }
            Err(error) => Err(store_error(error)),
        }
    }

    fn create_bucket(&self, bucket: &str) -> crate::Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match self.block_on(request.send()) {
            Ok(_) => tracing::info!(bucket, "Created bucket."),
            Err(error)
                if error.as_service_error().map_or(false, |service_error| {
                    service_error.is_bucket_already_owned_by_you()
                }) =>
            {
                tracing::info!(bucket, "Bucket already exists.");
            }
            Err(error) => return Err(store_error(error)),
        }

        let versioning = VersioningConfiguration::builder()
            .status(BucketVersioningStatus::Enabled)
            .build();
        self.block_on(
            self.client
                .put_bucket_versioning()
                .bucket(bucket)
                .versioning_configuration(versioning)
                .send(),
        )
        .map_err(store_error)?;
        tracing::info!(bucket, "Enabled versioning of bucket.");

        Ok(())
    }

    fn delete_bucket(&self, bucket: &str) -> crate::Result<()> {
        match self.block_on(self.client.delete_bucket().bucket(bucket).send()) {
            Ok(_) => {
                tracing::info!(bucket, "Deleted bucket.");
                Ok(())
            }
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => Err(no_such_bucket(bucket)),
            Err(error) => Err(store_error(error)),
        }
    }

    fn is_versioned(&self, bucket: &str) -> crate::Result<bool> {
        let output = match self.block_on(self.client.get_bucket_versioning().bucket(bucket).send())
        {
            Ok(output) => output,
            Err(error) if error.code() == Some(NO_SUCH_BUCKET) => {
                return Err(no_such_bucket(bucket))
            }
            Err(error) => return Err(store_error(error)),
        };

        // A suspended bucket still holds the versions written while versioning was enabled.
        Ok(matches!(
            output.status(),
            Some(BucketVersioningStatus::Enabled) | Some(BucketVersioningStatus::Suspended)
        ))
    }
}
