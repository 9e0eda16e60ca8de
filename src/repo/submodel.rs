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
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::model::{Document, Element, ElementPath, Operation, Submodel};
use crate::store::ObjectStore;

use super::document_bucket::DocumentBucket;
use super::index::ShortNameIndex;
use super::lock::WriteLocks;
use super::operation::OperationDelegate;
use super::resolver;

/// The collaborators shared by every view of the documents in one submodel bucket.
#[derive(Debug)]
struct SubmodelContext {
    bucket: DocumentBucket<Submodel>,
    locks: WriteLocks,
    index: ShortNameIndex,
    delegate: Option<Arc<dyn OperationDelegate>>,
}

impl SubmodelContext {
    /// Write `submodel` and record its short name.
    fn save(&self, submodel: &Submodel) -> crate::Result<()> {
        self.bucket.save(submodel)?;
        self.index.insert(submodel.id_short(), submodel.identifier());
        Ok(())
    }
}

/// Path-based access to the elements of one stored submodel.
///
/// Every read fetches the current document from the object store. Every change reads the whole
/// document, changes it in memory and writes the whole document back while holding the write lock
/// for this submodel, so concurrent changes through the same repository are never lost.
///
/// Element paths are `/`-separated short names, like `collection/nested/property`.
#[derive(Debug, Clone)]
pub struct SubmodelApi {
    identifier: String,
    context: Arc<SubmodelContext>,
}

impl SubmodelApi {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Run `f` on the current document and write the result back.
    fn modify<T>(&self, f: impl FnOnce(&mut Submodel) -> crate::Result<T>) -> crate::Result<T> {
        self.context.locks.with_lock(&self.identifier, || {
            let mut submodel = self.submodel()?;
            let result = f(&mut submodel)?;
            self.context.save(&submodel)?;
            Ok(result)
        })
    }

    /// Return the stored submodel.
    ///
    /// # Errors
    /// - `Error::NotFound`: The submodel is no longer in the store.
    /// - `Error::Deserialize`: The stored object is not a valid submodel.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn submodel(&self) -> crate::Result<Submodel> {
        self.context.bucket.load(&self.identifier)
    }

    /// Replace the stored submodel with `submodel`.
    ///
    /// # Errors
    /// - `Error::UnsupportedOperation`: `submodel` has a different identifier.
    /// - `Error::Serialize`: The submodel could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn set_submodel(&self, submodel: &Submodel) -> crate::Result<()> {
        if submodel.identifier() != self.identifier {
            return Err(crate::Error::UnsupportedOperation(format!(
                "cannot replace the submodel '{}' with the submodel '{}'",
                self.identifier,
                submodel.identifier()
            )));
        }
        self.context
            .locks
            .with_lock(&self.identifier, || self.context.save(submodel))
    }

    /// Return the top-level elements of the submodel.
    pub fn elements(&self) -> crate::Result<Vec<Element>> {
        Ok(self.submodel()?.submodel_elements)
    }

    /// Return the top-level operations of the submodel.
    pub fn operations(&self) -> crate::Result<Vec<Operation>> {
        Ok(self
            .elements()?
            .into_iter()
            .filter_map(|element| match element {
                Element::Operation(operation) => Some(operation),
                _ => None,
            })
            .collect())
    }

    /// Return the element at `path`.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The path is empty.
    /// - `Error::PathNotResolvable`: An element on the way is missing or is not a collection.
    /// - `Error::NotFound`: The element or the submodel does not exist.
    pub fn element(&self, path: &str) -> crate::Result<Element> {
        let path = ElementPath::parse(path)?;
        let submodel = self.submodel()?;
        resolver::read(&submodel.submodel_elements, &path).map(Clone::clone)
    }

    /// Add `element` to the top level of the submodel, replacing any element with its short name.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The short name of `element` is empty or contains a `/`.
    /// - `Error::NotFound`: The submodel does not exist.
    pub fn add_element(&self, element: Element) -> crate::Result<()> {
        let path = ElementPath::from_segments([element.id_short()])?;
        self.modify(|submodel| resolver::write(&mut submodel.submodel_elements, &path, element))?;
        tracing::info!(submodel = %self.identifier, path = %path, "Added element.");
        Ok(())
    }

    /// Put `element` at `path`, replacing any element already there.
    ///
    /// The element takes the last segment of `path` as its short name.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The path is empty.
    /// - `Error::PathNotResolvable`: The parent of `path` is missing or is not a collection.
    /// - `Error::NotFound`: The submodel does not exist.
    pub fn add_element_at(&self, path: &str, element: Element) -> crate::Result<()> {
        let path = ElementPath::parse(path)?;
        self.modify(|submodel| resolver::write(&mut submodel.submodel_elements, &path, element))?;
        tracing::info!(submodel = %self.identifier, path = %path, "Added element.");
        Ok(())
    }

    /// Remove the element at `path`.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The path is empty.
    /// - `Error::PathNotResolvable`: An element on the way is missing or is not a collection.
    /// - `Error::NotFound`: The element or the submodel does not exist.
    pub fn delete_element(&self, path: &str) -> crate::Result<()> {
        let path = ElementPath::parse(path)?;
        self.modify(|submodel| resolver::delete(&mut submodel.submodel_elements, &path))?;
        tracing::info!(submodel = %self.identifier, path = %path, "Deleted element.");
        Ok(())
    }

    /// Return the value of the element at `path`.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The path is empty.
    /// - `Error::PathNotResolvable`: An element on the way is missing or is not a collection.
    /// - `Error::NotFound`: The element or the submodel does not exist.
    /// - `Error::UnsupportedOperation`: The element is an operation.
    pub fn element_value(&self, path: &str) -> crate::Result<Value> {
        let path = ElementPath::parse(path)?;
        let submodel = self.submodel()?;
        resolver::read_value(&submodel.submodel_elements, &path)
    }

    /// Set the value of the property at `path`.
    ///
    /// A payload of the form `{"valueType": ..., "value": ...}` stores only its `value`.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The path is empty.
    /// - `Error::PathNotResolvable`: An element on the way is missing or is not a collection.
    /// - `Error::NotFound`: The element or the submodel does not exist.
    /// - `Error::UnsupportedOperation`: The element is not a property.
    pub fn update_element_value(&self, path: &str, value: Value) -> crate::Result<()> {
        let path = ElementPath::parse(path)?;
        self.modify(|submodel| resolver::write_value(&mut submodel.submodel_elements, &path, value))?;
        tracing::info!(submodel = %self.identifier, path = %path, "Updated element value.");
        Ok(())
    }

    /// Invoke the operation at `path` with `arguments`.
    ///
    /// # Errors
    /// - `Error::UnsupportedOperation`: The element is not an operation, the operation does not
    /// delegate to an endpoint, or no delegate is configured.
    /// - `Error::InvalidPath`: The path is empty.
    /// - `Error::PathNotResolvable`: An element on the way is missing or is not a collection.
    /// - `Error::NotFound`: The element or the submodel does not exist.
    pub fn invoke_operation(&self, path: &str, arguments: &[Value]) -> crate::Result<Value> {
        let invokable = match self.element(path)? {
            Element::Operation(Operation {
                invokable: Some(invokable),
                ..
            }) => invokable,
            Element::Operation(_) => {
                return Err(crate::Error::UnsupportedOperation(String::from(
                    "only delegating operations can be invoked",
                )))
            }
            other => {
                return Err(crate::Error::UnsupportedOperation(format!(
                    "the {} '{}' is not an operation",
                    other.model_type(),
                    path
                )))
            }
        };

        match &self.context.delegate {
            Some(delegate) => {
                tracing::debug!(
                    submodel = %self.identifier,
                    path,
                    invokable = %invokable,
                    "Delegating operation."
                );
                delegate.invoke(&invokable, arguments)
            }
            None => Err(crate::Error::UnsupportedOperation(String::from(
                "no delegate is configured to invoke operations",
            ))),
        }
    }

    /// Asynchronous invocation is not supported for stored submodels.
    ///
    /// # Errors
    /// - `Error::UnsupportedOperation`: Always.
    pub fn invoke_async(&self, path: &str, _arguments: &[Value]) -> crate::Result<String> {
        Err(crate::Error::UnsupportedOperation(format!(
            "cannot invoke '{}' asynchronously on a stored submodel",
            path
        )))
    }

    /// Asynchronous invocation is not supported for stored submodels.
    ///
    /// # Errors
    /// - `Error::UnsupportedOperation`: Always.
    pub fn operation_result(&self, path: &str, request_id: &str) -> crate::Result<Value> {
        Err(crate::Error::UnsupportedOperation(format!(
            "there is no result '{}' for '{}' on a stored submodel",
            request_id, path
        )))
    }
}

/// A repository of submodels stored in one bucket.
///
/// The repository keeps a routing table from the identifier of each submodel to a
/// [`SubmodelApi`]. The table is built from the contents of the bucket when the repository is
/// opened and is kept current by the methods of this type. It is guarded by a read-write lock, so a
/// `SubmodelRepo` can be shared between threads.
#[derive(Debug)]
pub struct SubmodelRepo {
    context: Arc<SubmodelContext>,
    routes: RwLock<BTreeMap<String, SubmodelApi>>,
}

impl SubmodelRepo {
    /// Open the repository of submodels in `bucket`.
    ///
    /// The bucket is created with versioning enabled if it does not exist. Then every object in the
    /// bucket is read to build the routing table.
    ///
    /// # Errors
    /// - `Error::NamingViolation`: The bucket name is invalid.
    /// - `Error::Deserialize`: An object in the bucket is not a valid submodel.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn open(store: Arc<dyn ObjectStore>, bucket: &str) -> crate::Result<Self> {
        Self::open_with_delegate(store, bucket, None)
    }

    /// Open the repository of submodels in `bucket` and invoke operations through `delegate`.
    ///
    /// # Errors
    /// - `Error::NamingViolation`: The bucket name is invalid.
    /// - `Error::Deserialize`: An object in the bucket is not a valid submodel.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn open_with_delegate(
        store: Arc<dyn ObjectStore>,
        bucket: &str,
        delegate: Option<Arc<dyn OperationDelegate>>,
    ) -> crate::Result<Self> {
        let context = Arc::new(SubmodelContext {
            bucket: DocumentBucket::open(store, bucket)?,
            locks: WriteLocks::new(),
            index: ShortNameIndex::new(),
            delegate,
        });
        let repo = SubmodelRepo {
            context,
            routes: RwLock::new(BTreeMap::new()),
        };
        repo.rebuild()?;
        Ok(repo)
    }

    /// Replace the routing table with one entry for each submodel in the bucket.
    fn rebuild(&self) -> crate::Result<()> {
        let mut routes = BTreeMap::new();
        for key in self.context.bucket.identifiers()? {
            let submodel = self.context.bucket.load(&key)?;
            self.context
                .index
                .insert_first(submodel.id_short(), submodel.identifier());
            routes.insert(key.clone(), self.view(&key));
        }

        tracing::info!(
            bucket = self.bucket(),
            submodels = routes.len(),
            "Loaded submodels from bucket."
        );
        *self.routes.write().unwrap_or_else(PoisonError::into_inner) = routes;
        Ok(())
    }

    fn view(&self, identifier: &str) -> SubmodelApi {
        SubmodelApi {
            identifier: identifier.to_owned(),
            context: Arc::clone(&self.context),
        }
    }

    /// The name of the bucket holding the submodels.
    pub fn bucket(&self) -> &str {
        self.context.bucket.name()
    }

    /// Store `submodel` and return the interface to its elements.
    ///
    /// If a submodel with the same identifier exists, it is replaced.
    ///
    /// # Errors
    /// - `Error::Serialize`: The submodel could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn create(&self, submodel: &Submodel) -> crate::Result<SubmodelApi> {
        let identifier = submodel.identifier();
        let view = self
            .context
            .locks
            .with_lock(identifier, || -> crate::Result<SubmodelApi> {
                self.context.save(submodel)?;
                let view = self.view(identifier);
                self.routes
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(identifier.to_owned(), view.clone());
                Ok(view)
            })?;
        tracing::info!(bucket = self.bucket(), identifier, "Created submodel.");
        Ok(view)
    }

    /// Return the interface to the submodel `identifier`.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such submodel.
    pub fn get(&self, identifier: &str) -> crate::Result<SubmodelApi> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .ok_or_else(|| crate::Error::NotFound(format!("submodel '{}'", identifier)))
    }

    /// Whether the repository holds the submodel `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(identifier)
    }

    /// Return the interface to the submodel with the short name `short_name`.
    ///
    /// # Errors
    /// - `Error::NotFound`: No submodel has this short name.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn get_by_short_name(&self, short_name: &str) -> crate::Result<SubmodelApi> {
        match self.resolve_short_name(short_name)? {
            Some(identifier) => self.get(&identifier),
            None => Err(crate::Error::NotFound(format!(
                "submodel with short name '{}'",
                short_name
            ))),
        }
    }

    /// Return the identifier of the submodel with the short name `short_name`, if any.
    pub fn resolve_short_name(&self, short_name: &str) -> crate::Result<Option<String>> {
        self.context.index.resolve(
            self.context.bucket.store(),
            self.context.bucket.name(),
            short_name,
        )
    }

    /// Return the interfaces to every submodel, ordered by identifier.
    pub fn get_all(&self) -> Vec<SubmodelApi> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Replace the stored submodel which has the identifier of `submodel`.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such submodel.
    /// - `Error::Serialize`: The submodel could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn update(&self, submodel: &Submodel) -> crate::Result<SubmodelApi> {
        let view = self.get(submodel.identifier())?;
        view.set_submodel(submodel)?;
        tracing::info!(
            bucket = self.bucket(),
            identifier = submodel.identifier(),
            "Updated submodel."
        );
        Ok(view)
    }

    /// Delete the submodel `identifier` and every stored version of it.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such submodel in the bucket.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn delete(&self, identifier: &str) -> crate::Result<()> {
        self.context.locks.with_lock(identifier, || {
            self.context.bucket.delete(identifier)?;
            self.context.index.remove_identifier(identifier);
            self.routes
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(identifier);
            Ok(())
        })
    }

    /// Delete the submodel with the short name `short_name`.
    ///
    /// # Errors
    /// - `Error::NotFound`: No submodel has this short name.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn delete_by_short_name(&self, short_name: &str) -> crate::Result<()> {
        match self.resolve_short_name(short_name)? {
            Some(identifier) => self.delete(&identifier),
            None => Err(crate::Error::NotFound(format!(
                "submodel with short name '{}'",
                short_name
            ))),
        }
    }

    /// Delete every submodel in the bucket.
    pub fn reset(&self) -> crate::Result<()> {
        self.context.bucket.wipe()?;
        self.context.index.clear();
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
