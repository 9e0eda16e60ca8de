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

use shell_store::model::{Element, Reference, Shell, Submodel};
use shell_store::repo::{ShellRepo, SubmodelRepo};
use shell_store::store::MemoryStore;

use super::store::memory_store;

pub const SHELL_BUCKET: &str = "test-shells";
pub const SUBMODEL_BUCKET: &str = "test-submodels";

/// A shell repository and its submodel repository sharing one memory store.
pub struct Repos {
    pub store: Arc<MemoryStore>,
    pub submodels: Arc<SubmodelRepo>,
    pub shells: ShellRepo,
}

impl Repos {
    pub fn open(store: Arc<MemoryStore>) -> anyhow::Result<Self> {
        let submodels = Arc::new(SubmodelRepo::open(store.clone(), SUBMODEL_BUCKET)?);
        let shells = ShellRepo::open(store.clone(), SHELL_BUCKET, Arc::clone(&submodels))?;
        Ok(Repos {
            store,
            submodels,
            shells,
        })
    }

    /// Open new repositories over the same store, as a restarted process would.
    pub fn reopen(&self) -> anyhow::Result<Self> {
        Repos::open(Arc::clone(&self.store))
    }
}

#[fixture]
pub fn repos(memory_store: Arc<MemoryStore>) -> Repos {
    Repos::open(memory_store).unwrap()
}

#[fixture]
pub fn submodel_repo(memory_store: Arc<MemoryStore>) -> SubmodelRepo {
    SubmodelRepo::open(memory_store, SUBMODEL_BUCKET).unwrap()
}

/// A submodel with a property, a nested collection and two operations.
pub fn sample_submodel(id_short: &str, identifier: &str) -> Submodel {
    Submodel::new(id_short, identifier)
        .with_element(Element::property("temperature", 21))
        .with_element(Element::collection(
            "settings",
            vec![
                Element::property("mode", "auto"),
                Element::collection("limits", vec![Element::property("max", 80)]),
            ],
        ))
        .with_element(Element::operation("reset", None))
        .with_element(Element::operation("calibrate", Some("http://device/calibrate")))
}

/// A shell which refers to each of `submodels`.
pub fn sample_shell(id_short: &str, identifier: &str, submodels: Vec<Reference>) -> Shell {
    let mut shell = Shell::new(id_short, identifier);
    shell.submodels = submodels;
    shell
}
