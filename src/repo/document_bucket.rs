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

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::model::Document;
use crate::store::{create_bucket_if_not_exists, wipe_bucket, ObjectStore};

use super::codec::{deserialize, extract_metadata, serialize};
use super::deleter::delete_document;

/// The bucket which holds every document of type `D`, one object per document.
pub struct DocumentBucket<D> {
    store: Arc<dyn ObjectStore>,
    name: String,
    marker: PhantomData<fn() -> D>,
}

impl<D> Clone for DocumentBucket<D> {
    fn clone(&self) -> Self {
        DocumentBucket {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            marker: PhantomData,
        }
    }
}

impl<D> fmt::Debug for DocumentBucket<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBucket")
            .field("store", &self.store)
            .field("name", &self.name)
            .finish()
    }
}

impl<D: Document> DocumentBucket<D> {
    /// Use the bucket `name` in `store`, creating it if it does not exist.
    ///
    /// # Errors
    /// - `Error::NamingViolation`: The bucket name is invalid.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn open(store: Arc<dyn ObjectStore>, name: &str) -> crate::Result<Self> {
        create_bucket_if_not_exists(store.as_ref(), name)?;
        Ok(DocumentBucket {
            store,
            name: name.to_owned(),
            marker: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Read and deserialize the document `identifier`.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such document.
    /// - `Error::Deserialize`: The object is not a valid document.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn load(&self, identifier: &str) -> crate::Result<D> {
        let data = self.store.get_object(&self.name, identifier)?;
        deserialize(&data)
    }

    /// Serialize `document` and write it under its identifier, replacing any previous object.
    ///
    /// # Errors
    /// - `Error::Serialize`: The document could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn save(&self, document: &D) -> crate::Result<()> {
        let body = serialize(document)?;
        let metadata = extract_metadata(document);
        self.store.put_object(
            &self.name,
            document.identifier(),
            body.as_bytes(),
            &metadata,
        )?;
        tracing::debug!(
            bucket = %self.name,
            identifier = document.identifier(),
            kind = D::KIND,
            "Uploaded document."
        );
        Ok(())
    }

    /// Return whether the document `identifier` exists.
    pub fn contains(&self, identifier: &str) -> crate::Result<bool> {
        match self.store.head_object(&self.name, identifier) {
            Ok(_) => Ok(true),
            Err(crate::Error::NotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Return the identifiers of every document in the bucket.
    pub fn identifiers(&self) -> crate::Result<Vec<String>> {
        self.store.list_keys(&self.name)
    }

    /// Delete the document `identifier` along with its version history.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such document.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn delete(&self, identifier: &str) -> crate::Result<()> {
        delete_document(self.store.as_ref(), &self.name, identifier)
    }

    /// Delete every document in the bucket.
    pub fn wipe(&self) -> crate::Result<()> {
        wipe_bucket(self.store.as_ref(), &self.name)
    }
}
