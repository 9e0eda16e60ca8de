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

use crate::model::{Document, Reference, ReferenceTarget, Shell, Submodel};
use crate::store::ObjectStore;

use super::document_bucket::DocumentBucket;
use super::lock::WriteLocks;
use super::submodel::{SubmodelApi, SubmodelRepo};

#[derive(Debug)]
struct ShellContext {
    bucket: DocumentBucket<Shell>,
    locks: WriteLocks,
}

/// Access to one stored shell document.
#[derive(Debug, Clone)]
pub struct ShellApi {
    identifier: String,
    context: Arc<ShellContext>,
}

impl ShellApi {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Shell) -> crate::Result<T>) -> crate::Result<T> {
        self.context.locks.with_lock(&self.identifier, || {
            let mut shell = self.shell()?;
            let result = f(&mut shell)?;
            self.context.bucket.save(&shell)?;
            Ok(result)
        })
    }

    /// Return the stored shell.
    ///
    /// # Errors
    /// - `Error::NotFound`: The shell is no longer in the store.
    /// - `Error::Deserialize`: The stored object is not a valid shell.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn shell(&self) -> crate::Result<Shell> {
        self.context.bucket.load(&self.identifier)
    }

    /// Replace the stored shell with `shell`.
    ///
    /// # Errors
    /// - `Error::UnsupportedOperation`: `shell` has a different identifier.
    /// - `Error::Serialize`: The shell could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn set_shell(&self, shell: &Shell) -> crate::Result<()> {
        if shell.identifier() != self.identifier {
            return Err(crate::Error::UnsupportedOperation(format!(
                "cannot replace the shell '{}' with the shell '{}'",
                self.identifier,
                shell.identifier()
            )));
        }
        self.context
            .locks
            .with_lock(&self.identifier, || self.context.bucket.save(shell))
    }

    /// Return the references to the submodels of the shell.
    pub fn submodel_references(&self) -> crate::Result<Vec<Reference>> {
        Ok(self.shell()?.submodels)
    }

    /// Add `reference` to the submodels of the shell unless the shell already has it.
    pub fn add_submodel_reference(&self, reference: Reference) -> crate::Result<()> {
        self.modify(|shell| {
            if !shell.submodels.contains(&reference) {
                shell.submodels.push(reference);
            }
            Ok(())
        })
    }

    /// Remove every submodel reference whose last key has the value `value`.
    ///
    /// # Errors
    /// - `Error::NotFound`: No reference of the shell ends in `value`.
    pub fn remove_submodel_reference(&self, value: &str) -> crate::Result<()> {
        self.modify(|shell| {
            let before = shell.submodels.len();
            shell
                .submodels
                .retain(|reference| reference.last_key().map_or(true, |key| key.value != value));
            if shell.submodels.len() == before {
                return Err(crate::Error::NotFound(format!(
                    "reference to '{}' in shell '{}'",
                    value, shell.identification.id
                )));
            }
            Ok(())
        })
    }
}

/// The submodels attached to one shell, in the order of its references.
#[derive(Debug, Default)]
struct SubmodelSet {
    entries: RwLock<Vec<SubmodelApi>>,
}

impl SubmodelSet {
    fn attach(&self, api: SubmodelApi) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries
            .iter_mut()
            .find(|entry| entry.identifier() == api.identifier())
        {
            Some(entry) => *entry = api,
            None => entries.push(api),
        }
    }

    fn detach(&self, identifier: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|entry| entry.identifier() != identifier);
    }

    fn get(&self, identifier: &str) -> Option<SubmodelApi> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|entry| entry.identifier() == identifier)
            .cloned()
    }

}

/// A shell together with the submodels it refers to.
///
/// This is the value held in the routing table of a [`ShellRepo`]. Submodels deleted from the
/// submodel repository are left out, even if the shell still refers to them.
#[derive(Debug, Clone)]
pub struct ShellView {
    api: ShellApi,
    submodels: Arc<SubmodelSet>,
    repo: Arc<SubmodelRepo>,
}

impl ShellView {
    pub fn identifier(&self) -> &str {
        self.api.identifier()
    }

    /// The interface to the shell document.
    pub fn api(&self) -> &ShellApi {
        &self.api
    }

    /// Return the stored shell.
    pub fn shell(&self) -> crate::Result<Shell> {
        self.api.shell()
    }

    /// The identifiers of the submodels which were resolved for this shell.
    pub fn submodel_ids(&self) -> Vec<String> {
        self.submodels()
            .iter()
            .map(|api| api.identifier().to_owned())
            .collect()
    }

    /// Return the interface to the submodel `identifier` of this shell.
    ///
    /// # Errors
    /// - `Error::NotFound`: The shell has no such submodel.
    pub fn submodel(&self, identifier: &str) -> crate::Result<SubmodelApi> {
        self.submodels
            .get(identifier)
            .filter(|api| self.repo.contains(api.identifier()))
            .ok_or_else(|| {
                crate::Error::NotFound(format!(
                    "submodel '{}' of shell '{}'",
                    identifier,
                    self.identifier()
                ))
            })
    }

    /// Return every submodel interface of this shell.
    pub fn submodels(&self) -> Vec<SubmodelApi> {
        self.submodels
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|api| self.repo.contains(api.identifier()))
            .cloned()
            .collect()
    }
}

/// A repository of shells stored in one bucket, each composed with its submodels.
///
/// The submodels live in the bucket of a [`SubmodelRepo`], which the shell repository shares. A
/// shell may refer to a submodel by identifier or by short name; references by short name are
/// resolved through the submodel repository's short-name index.
///
/// Like [`SubmodelRepo`], this keeps a routing table which is rebuilt from the bucket when the
/// repository is opened and is guarded by a read-write lock.
#[derive(Debug)]
pub struct ShellRepo {
    context: Arc<ShellContext>,
    submodels: Arc<SubmodelRepo>,
    routes: RwLock<BTreeMap<String, ShellView>>,
}

impl ShellRepo {
    /// Open the repository of shells in `bucket`, whose submodels are stored in `submodels`.
    ///
    /// The bucket is created with versioning enabled if it does not exist. Then every shell in the
    /// bucket is read and its submodel references are resolved. A reference which cannot be
    /// resolved is logged and skipped; the shell is still registered.
    ///
    /// # Errors
    /// - `Error::NamingViolation`: The bucket name is invalid.
    /// - `Error::Deserialize`: An object in the bucket is not a valid shell.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn open(
        store: Arc<dyn ObjectStore>,
        bucket: &str,
        submodels: Arc<SubmodelRepo>,
    ) -> crate::Result<Self> {
        let context = Arc::new(ShellContext {
            bucket: DocumentBucket::open(store, bucket)?,
            locks: WriteLocks::new(),
        });
        let repo = ShellRepo {
            context,
            submodels,
            routes: RwLock::new(BTreeMap::new()),
        };
        repo.rebuild()?;
        Ok(repo)
    }

    fn rebuild(&self) -> crate::Result<()> {
        let mut routes = BTreeMap::new();
        for key in self.context.bucket.identifiers()? {
            let shell = self.context.bucket.load(&key)?;
            let view = self.compose(&key, Arc::new(SubmodelSet::default()));
            self.resolve_submodels(&shell, &view.submodels)?;
            routes.insert(key, view);
        }

        tracing::info!(
            bucket = self.bucket(),
            shells = routes.len(),
            "Loaded shells from bucket."
        );
        *self.routes.write().unwrap_or_else(PoisonError::into_inner) = routes;
        Ok(())
    }

    fn compose(&self, identifier: &str, submodels: Arc<SubmodelSet>) -> ShellView {
        ShellView {
            api: ShellApi {
                identifier: identifier.to_owned(),
                context: Arc::clone(&self.context),
            },
            submodels,
            repo: Arc::clone(&self.submodels),
        }
    }

    /// Attach the submodel each reference of `shell` points at to `set`.
    fn resolve_submodels(&self, shell: &Shell, set: &SubmodelSet) -> crate::Result<()> {
        for reference in &shell.submodels {
            let identifier = match reference.target() {
                Some(ReferenceTarget::Identifier(identifier)) => Some(identifier.to_owned()),
                Some(ReferenceTarget::ShortName(short_name)) => {
                    self.submodels.resolve_short_name(short_name)?
                }
                None => None,
            };

            match identifier.and_then(|identifier| self.submodels.get(&identifier).ok()) {
                Some(api) => set.attach(api),
                None => tracing::warn!(
                    shell = shell.identifier(),
                    reference = ?reference,
                    "Could not resolve submodel reference."
                ),
            }
        }
        Ok(())
    }

    /// The name of the bucket holding the shells.
    pub fn bucket(&self) -> &str {
        self.context.bucket.name()
    }

    /// The repository of the submodels of these shells.
    pub fn submodel_repo(&self) -> &SubmodelRepo {
        &self.submodels
    }

    /// Store `shell` and register it along with the submodels it refers to.
    ///
    /// If a shell with the same identifier exists, it is replaced.
    ///
    /// # Errors
    /// - `Error::Serialize`: The shell could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn create(&self, shell: &Shell) -> crate::Result<ShellView> {
        let identifier = shell.identifier();
        let view = self
            .context
            .locks
            .with_lock(identifier, || -> crate::Result<ShellView> {
                self.context.bucket.save(shell)?;
                let view = self.compose(identifier, Arc::new(SubmodelSet::default()));
                self.resolve_submodels(shell, &view.submodels)?;
                self.routes
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(identifier.to_owned(), view.clone());
                Ok(view)
            })?;
        tracing::info!(bucket = self.bucket(), identifier, "Created shell.");
        Ok(view)
    }

    /// Return the shell `identifier` with its submodels.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such shell.
    pub fn get(&self, identifier: &str) -> crate::Result<ShellView> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .ok_or_else(|| crate::Error::NotFound(format!("shell '{}'", identifier)))
    }

    /// Return every shell, ordered by identifier.
    pub fn get_all(&self) -> Vec<ShellView> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Replace the stored shell which has the identifier of `shell`.
    ///
    /// The submodels attached to the previous version of the shell stay attached.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such shell.
    /// - `Error::Serialize`: The shell could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn update(&self, shell: &Shell) -> crate::Result<ShellView> {
        let identifier = shell.identifier();
        let view = self
            .context
            .locks
            .with_lock(identifier, || -> crate::Result<ShellView> {
                let previous = self.get(identifier)?;
                self.context.bucket.save(shell)?;
                let view = self.compose(identifier, Arc::clone(&previous.submodels));
                self.routes
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(identifier.to_owned(), view.clone());
                Ok(view)
            })?;
        tracing::info!(bucket = self.bucket(), identifier, "Updated shell.");
        Ok(view)
    }

    /// Delete the shell `identifier` and every stored version of it.
    ///
    /// The submodels of the shell are not deleted.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such shell in the bucket.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn delete(&self, identifier: &str) -> crate::Result<()> {
        self.context.locks.with_lock(identifier, || {
            self.context.bucket.delete(identifier)?;
            self.routes
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(identifier);
            tracing::info!(bucket = self.bucket(), identifier, "Deleted shell.");
            Ok(())
        })
    }

    /// Store `submodel`, add a reference to it to the shell `shell_id` and attach it.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such shell.
    /// - `Error::Serialize`: The submodel could not be serialized.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn add_submodel(&self, shell_id: &str, submodel: &Submodel) -> crate::Result<SubmodelApi> {
        let view = self.get(shell_id)?;
        let api = self.submodels.create(submodel)?;
        view.api
            .add_submodel_reference(Reference::submodel(submodel.identifier()))?;
        view.submodels.attach(api.clone());
        Ok(api)
    }

    /// Delete the submodel `submodel_id` of the shell `shell_id`.
    ///
    /// The submodel document is deleted along with its version history, and the references to it
    /// by identifier or by short name are removed from the shell.
    ///
    /// # Errors
    /// - `Error::NotFound`: There is no such shell, or the shell has no such submodel.
    /// - `Error::StoreUnavailable`: An error occurred with the object store.
    pub fn remove_submodel(&self, shell_id: &str, submodel_id: &str) -> crate::Result<()> {
        let view = self.get(shell_id)?;
        let api = view.submodel(submodel_id)?;
        let short_name = api.submodel()?.id_short;

        self.submodels.delete(submodel_id)?;
        view.submodels.detach(submodel_id);

        let mut removed = false;
        for value in [submodel_id, short_name.as_str()] {
            match view.api.remove_submodel_reference(value) {
                Ok(()) => removed = true,
                Err(crate::Error::NotFound(_)) => {}
                Err(error) => return Err(error),
            }
        }
        if !removed {
            tracing::warn!(
                shell = shell_id,
                submodel = submodel_id,
                "Shell had no reference to the removed submodel."
            );
        }
        Ok(())
    }

    /// Delete every shell and every submodel.
    pub fn reset(&self) -> crate::Result<()> {
        self.context.bucket.wipe()?;
        self.submodels.reset()?;
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!(bucket = self.bucket(), "Reset shells and submodels.");
        Ok(())
    }
}
