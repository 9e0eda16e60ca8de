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

use std::env;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{normalize_bucket_name, BucketFamily, ObjectStore};

use super::operation::OperationDelegate;
use super::shell::ShellRepo;
use super::submodel::SubmodelRepo;

/// The names of the buckets which hold shells and submodels.
///
/// Either name may be omitted, in which case a name is generated from the current time when the
/// repositories are opened. Configured names are normalized before they are used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// The name of the bucket which holds shells.
    pub shell_bucket: Option<String>,

    /// The name of the bucket which holds submodels.
    pub submodel_bucket: Option<String>,
}

impl BucketConfig {
    /// Read the bucket names from `S3_SHELL_BUCKET` and `S3_SUBMODEL_BUCKET`.
    pub fn from_env() -> Self {
        let var = |name| env::var(name).ok().filter(|value: &String| !value.is_empty());
        BucketConfig {
            shell_bucket: var("S3_SHELL_BUCKET"),
            submodel_bucket: var("S3_SUBMODEL_BUCKET"),
        }
    }

    /// The normalized name of the shell bucket.
    ///
    /// # Errors
    /// - `Error::NamingViolation`: The configured name is not a valid bucket name.
    pub fn shell_bucket_name(&self) -> crate::Result<String> {
        normalize_bucket_name(self.shell_bucket.as_deref(), BucketFamily::Shells)
    }

    /// The normalized name of the submodel bucket.
    ///
    /// # Errors
    /// - `Error::NamingViolation`: The configured name is not a valid bucket name.
    pub fn submodel_bucket_name(&self) -> crate::Result<String> {
        normalize_bucket_name(self.submodel_bucket.as_deref(), BucketFamily::Submodels)
    }

    /// Open the shell repository and its submodel repository in `store`.
    ///
    /// The submodel repository is available through [`ShellRepo::submodel_repo`].
    ///
    /// # Errors
    /// - `Error::NamingViolation`: A bucket name is invalid.
    /// - `Error::Deserialize`: An object in one of the buckets is not a valid document.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn open(
        &self,
        store: Arc<dyn ObjectStore>,
        delegate: Option<Arc<dyn OperationDelegate>>,
    ) -> crate::Result<ShellRepo> {
        let submodels = SubmodelRepo::open_with_delegate(
            Arc::clone(&store),
            &self.submodel_bucket_name()?,
            delegate,
        )?;
        ShellRepo::open(store, &self.shell_bucket_name()?, Arc::new(submodels))
    }
}
