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

//! Repositories of shells and submodels.
//!
//! Each document family lives in its own bucket of an [`ObjectStore`], one JSON object per document
//! keyed by the document's identifier. A [`SubmodelRepo`] owns the submodel bucket and a
//! [`ShellRepo`] owns the shell bucket and shares the submodel repository, so that each shell can
//! be composed with the submodels it refers to.
//!
//! # Routing
//! Each repository keeps a routing table from identifiers to views of the stored documents. The
//! table is rebuilt from the bucket when the repository is opened, so documents written by an
//! earlier process are served again. Views read the current document from the store on every call.
//!
//! # Consistency
//! Every change reads a whole document, changes it in memory and writes it back. These steps are
//! serialized per document within one process by [`WriteLocks`]. **Repositories do not coordinate
//! with other processes writing to the same buckets**; concurrent writers in different processes
//! can overwrite each other's changes.
//!
//! # Deletion
//! Deleting a document from a versioned bucket deletes every stored version of it, including
//! delete markers, so the object is gone for good.
//!
//! [`ObjectStore`]: crate::store::ObjectStore

pub use self::config::BucketConfig;
pub use self::deleter::delete_document;
pub use self::document_bucket::DocumentBucket;
pub use self::index::{resolve_short_name, ShortNameIndex};
pub use self::lock::WriteLocks;
pub use self::operation::OperationDelegate;
pub use self::shell::{ShellApi, ShellRepo, ShellView};
pub use self::submodel::{SubmodelApi, SubmodelRepo};

pub mod codec;
pub mod resolver;

mod config;
mod deleter;
mod document_bucket;
mod index;
mod lock;
mod operation;
mod shell;
mod submodel;
