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

//! `shell-store` is a library for persisting shell and submodel documents in an S3-compatible
//! object store.
//!
//! Documents are stored as JSON, one object per document, in one bucket per document family. Each
//! object carries its identifier, short name, semantic ID and a timestamp as user metadata, so that
//! documents can be found by short name without downloading them.
//!
//! This library provides the following abstractions:
//! - `SubmodelRepo` stores submodels and provides path-based access to their elements through
//! `SubmodelApi`.
//! - `ShellRepo` stores shells and composes each shell with the submodels it refers to, whether by
//! identifier or by short name.
//!
//! A repository stores its documents in an `ObjectStore`, which is a small trait that can be
//! implemented to create new storage backends. The following object stores are provided:
//! - `S3Store` stores documents in an S3-compatible service.
//! - `MemoryStore` stores documents in memory.
//!
//! The function `init` installs a logging subscriber and may be called before any other functions
//! in this crate.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use shell_store::init;
//! use shell_store::model::{Element, Reference, Shell, Submodel};
//! use shell_store::repo::{ShellRepo, SubmodelRepo};
//! use shell_store::store::MemoryStore;
//!
//! fn main() -> shell_store::Result<()> {
//!     init();
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let submodels = Arc::new(SubmodelRepo::open(store.clone(), "submodels")?);
//!     let shells = ShellRepo::open(store, "shells", submodels.clone())?;
//!
//!     // Store a submodel and a shell which refers to it by short name.
//!     let submodel = Submodel::new("sm1", "SM-001")
//!         .with_element(Element::property("temperature", 21.5));
//!     submodels.create(&submodel)?;
//!
//!     let mut shell = Shell::new("S1", "S1");
//!     shell.submodels.push(Reference::submodel_short_name("sm1"));
//!     let view = shells.create(&shell)?;
//!
//!     // Read an element value through the shell.
//!     let value = view.submodel("SM-001")?.element_value("temperature")?;
//!     assert_eq!(value, 21.5);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//! Some functionality is gated behind cargo features:
//!
//! Type | Cargo Feature
//! --- | ---
//! `S3Store` | `store-s3`
//!
//! To use one of these types, you must enable the corresponding feature in your `Cargo.toml`.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use env::init;
pub use error::{Error, NamingRule, Result};

mod env;
mod error;
pub mod model;
pub mod repo;
pub mod store;
