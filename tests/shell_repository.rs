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

#[cfg(feature = "store-s3")]
use serial_test::serial;
use serde_json::json;

use common::*;
use shell_store::model::{Reference, Shell};
use shell_store::repo::BucketConfig;
#[cfg(feature = "store-s3")]
use shell_store::repo::{ShellRepo, SubmodelRepo};
use shell_store::store::{MemoryStore, ObjectStore};
use shell_store::Error;

mod common;

fn sorted_ids(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

#[rstest]
fn short_name_references_are_resolved_on_rebuild(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    let shell = sample_shell("S1", "S1", vec![Reference::submodel_short_name("sm1")]);
    repos.shells.create(&shell)?;

    let repos = repos.reopen()?;
    let view = repos.shells.get("S1")?;

    assert_that!(view.submodel_ids()).is_equal_to(vec![String::from("SM-001")]);
    assert_that!(view.submodel("SM-001")?.element_value("temperature")?).is_equal_to(json!(21));
    assert_that!(view.shell()?).is_equal_to(&shell);

    Ok(())
}

#[rstest]
fn identifier_references_are_resolved(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    repos.submodels.create(&sample_submodel("sm2", "SM-002"))?;
    let shell = sample_shell(
        "S1",
        "S1",
        vec![Reference::submodel("SM-002"), Reference::submodel_short_name("sm1")],
    );

    let view = repos.shells.create(&shell)?;

    assert_that!(view.submodel_ids())
        .is_equal_to(vec![String::from("SM-002"), String::from("SM-001")]);

    Ok(())
}

#[rstest]
fn unresolved_references_are_skipped(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    let shell = sample_shell(
        "S1",
        "S1",
        vec![
            Reference::submodel_short_name("ghost"),
            Reference::submodel("SM-404"),
            Reference::new(Vec::new()),
            Reference::submodel("SM-001"),
        ],
    );
    repos.shells.create(&shell)?;

    let repos = repos.reopen()?;
    let view = repos.shells.get("S1")?;

    assert_that!(view.submodel_ids()).is_equal_to(vec![String::from("SM-001")]);
    assert_that!(view.submodel("SM-404")).is_err_variant(Error::NotFound(String::new()));

    Ok(())
}

#[rstest]
fn unknown_shells_are_not_found(repos: Repos) {
    assert_that!(repos.shells.get("S404")).is_err_variant(Error::NotFound(String::new()));
    assert_that!(repos.shells.update(&Shell::new("S404", "S404")))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(repos.shells.delete("S404")).is_err_variant(Error::NotFound(String::new()));
}

#[rstest]
fn every_shell_is_listed(repos: Repos) -> anyhow::Result<()> {
    repos.shells.create(&Shell::new("S2", "S2"))?;
    repos.shells.create(&Shell::new("S1", "S1"))?;

    let repos = repos.reopen()?;
    let ids = repos
        .shells
        .get_all()
        .iter()
        .map(|view| view.identifier().to_owned())
        .collect::<Vec<_>>();

    assert_that!(ids).is_equal_to(vec![String::from("S1"), String::from("S2")]);

    Ok(())
}

#[rstest]
fn update_keeps_attached_submodels(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    repos.shells.create(&sample_shell("S1", "S1", vec![Reference::submodel("SM-001")]))?;

    let mut shell = repos.shells.get("S1")?.shell()?;
    shell.id_short = String::from("renamed");
    let view = repos.shells.update(&shell)?;

    assert_that!(view.shell()?.id_short).is_equal_to(String::from("renamed"));
    assert_that!(view.submodel_ids()).is_equal_to(vec![String::from("SM-001")]);
    assert_that!(repos.store.list_keys(SHELL_BUCKET)?).is_equal_to(vec![String::from("S1")]);

    Ok(())
}

#[rstest]
fn deleting_shell_keeps_its_submodels(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    repos.shells.create(&sample_shell("S1", "S1", vec![Reference::submodel("SM-001")]))?;

    repos.shells.delete("S1")?;

    assert_that!(repos.shells.get("S1")).is_err_variant(Error::NotFound(String::new()));
    assert_that!(repos.submodels.get("SM-001")).is_ok();
    assert_that!(repos.reopen()?.shells.get_all()).is_empty();

    Ok(())
}

#[rstest]
fn added_submodels_are_referenced_and_attached(repos: Repos) -> anyhow::Result<()> {
    repos.shells.create(&Shell::new("S1", "S1"))?;

    repos.shells.add_submodel("S1", &sample_submodel("sm1", "SM-001"))?;
    repos.shells.add_submodel("S1", &sample_submodel("sm1", "SM-001"))?;

    let view = repos.shells.get("S1")?;
    assert_that!(view.submodel_ids()).is_equal_to(vec![String::from("SM-001")]);
    assert_that!(view.api().submodel_references()?)
        .is_equal_to(vec![Reference::submodel("SM-001")]);

    let repos = repos.reopen()?;
    assert_that!(repos.shells.get("S1")?.submodel_ids()).is_equal_to(vec![String::from("SM-001")]);

    Ok(())
}

#[rstest]
fn adding_submodel_to_unknown_shell_errs(repos: Repos) {
    assert_that!(repos.shells.add_submodel("S404", &sample_submodel("sm1", "SM-001")))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(repos.submodels.get_all()).is_empty();
}

#[rstest]
fn removed_submodels_are_deleted_and_dereferenced(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    repos.submodels.create(&sample_submodel("sm2", "SM-002"))?;
    repos.shells.create(&sample_shell(
        "S1",
        "S1",
        vec![Reference::submodel_short_name("sm1"), Reference::submodel("SM-002")],
    ))?;

    repos.shells.remove_submodel("S1", "SM-001")?;

    let view = repos.shells.get("S1")?;
    assert_that!(view.submodel_ids()).is_equal_to(vec![String::from("SM-002")]);
    assert_that!(view.api().submodel_references()?)
        .is_equal_to(vec![Reference::submodel("SM-002")]);
    assert_that!(repos.submodels.get("SM-001")).is_err_variant(Error::NotFound(String::new()));
    assert_that!(repos.shells.remove_submodel("S1", "SM-001"))
        .is_err_variant(Error::NotFound(String::new()));

    Ok(())
}

#[rstest]
fn submodels_deleted_elsewhere_leave_the_view(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    repos.submodels.create(&sample_submodel("sm2", "SM-002"))?;
    let shell = sample_shell(
        "S1",
        "S1",
        vec![Reference::submodel("SM-001"), Reference::submodel("SM-002")],
    );
    let view = repos.shells.create(&shell)?;

    repos.submodels.delete("SM-001")?;

    assert_that!(view.submodel_ids()).is_equal_to(vec![String::from("SM-002")]);
    assert_that!(view.submodel("SM-001")).is_err_variant(Error::NotFound(String::new()));
    assert_that!(repos.shells.get("S1")?.submodels()).has_length(1);

    Ok(())
}

#[rstest]
fn references_are_edited_through_the_shell(repos: Repos) -> anyhow::Result<()> {
    let view = repos.shells.create(&Shell::new("S1", "S1"))?;
    let api = view.api();

    api.add_submodel_reference(Reference::submodel_short_name("sm1"))?;
    api.add_submodel_reference(Reference::submodel_short_name("sm1"))?;
    assert_that!(api.submodel_references()?).has_length(1);

    api.remove_submodel_reference("sm1")?;
    assert_that!(api.submodel_references()?).is_empty();
    assert_that!(api.remove_submodel_reference("sm1"))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(api.set_shell(&Shell::new("S2", "S2")))
        .is_err_variant(Error::UnsupportedOperation(String::new()));

    Ok(())
}

#[rstest]
fn reset_removes_shells_and_submodels(repos: Repos) -> anyhow::Result<()> {
    repos.submodels.create(&sample_submodel("sm1", "SM-001"))?;
    repos.shells.create(&sample_shell("S1", "S1", vec![Reference::submodel("SM-001")]))?;

    repos.shells.reset()?;

    assert_that!(repos.shells.get_all()).is_empty();
    assert_that!(repos.submodels.get_all()).is_empty();
    assert_that!(repos.store.list_keys(SHELL_BUCKET)?).is_empty();
    assert_that!(repos.store.list_keys(SUBMODEL_BUCKET)?).is_empty();

    Ok(())
}

#[rstest]
fn bucket_config_opens_both_repositories(memory_store: Arc<MemoryStore>) -> anyhow::Result<()> {
    let config = BucketConfig {
        shell_bucket: Some(String::from("Plant Shells")),
        submodel_bucket: Some(String::from("Plant Submodels")),
    };

    let shells = config.open(memory_store.clone(), None)?;
    assert_that!(shells.add_submodel("S1", &sample_submodel("sm1", "SM-001")))
        .is_err_variant(Error::NotFound(String::new()));
    shells.create(&Shell::new("S1", "S1"))?;
    shells.add_submodel("S1", &sample_submodel("sm1", "SM-001"))?;

    assert_that!(shells.bucket()).is_equal_to("plant-shells");
    assert_that!(shells.submodel_repo().bucket()).is_equal_to("plant-submodels");
    assert_that!(sorted_ids(memory_store.list_keys("plant-submodels")?))
        .is_equal_to(vec![String::from("SM-001")]);

    Ok(())
}

#[test]
#[serial(s3)]
#[cfg(feature = "store-s3")]
fn s3_short_name_references_are_resolved_on_rebuild() {
    let store = s3_store().unwrap();
    let shell_guard = BucketGuard {
        store: &store,
        bucket: unique_bucket("shells"),
    };
    let submodel_guard = BucketGuard {
        store: &store,
        bucket: unique_bucket("submodels"),
    };

    let open = || -> shell_store::Result<ShellRepo> {
        let submodels = SubmodelRepo::open(store.clone(), &submodel_guard.bucket)?;
        ShellRepo::open(store.clone(), &shell_guard.bucket, Arc::new(submodels))
    };

    let shells = open().unwrap();
    shells
        .submodel_repo()
        .create(&sample_submodel("sm1", "SM-001"))
        .unwrap();
    shells
        .create(&sample_shell("S1", "S1", vec![Reference::submodel_short_name("sm1")]))
        .unwrap();
    drop(shells);

    let shells = open().unwrap();
    assert_that!(shells.get("S1").unwrap().submodel_ids())
        .is_equal_to(vec![String::from("SM-001")]);

    shells.delete("S1").unwrap();
    assert_that!(store.list_versions(&shell_guard.bucket, None).unwrap().unwrap().versions)
        .is_empty();
}
