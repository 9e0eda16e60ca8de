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

use serde_json::json;

use common::*;
use shell_store::model::{Element, ElementPath};
use shell_store::repo::resolver;
use shell_store::Error;

mod common;

fn elements() -> Vec<Element> {
    sample_submodel("sm1", "SM-001").submodel_elements
}

fn path(path: &str) -> ElementPath {
    ElementPath::parse(path).unwrap()
}

#[test]
fn nested_elements_are_read() -> anyhow::Result<()> {
    let elements = elements();

    assert_that!(resolver::read(&elements, &path("settings/limits/max"))?)
        .is_equal_to(&Element::property("max", 80));
    assert_that!(resolver::read_value(&elements, &path("settings/mode"))?)
        .is_equal_to(json!("auto"));

    Ok(())
}

#[test]
fn collection_values_map_short_names() -> anyhow::Result<()> {
    let value = resolver::read_value(&elements(), &path("settings"))?;

    assert_that!(value).is_equal_to(json!({"mode": "auto", "limits": {"max": 80}}));

    Ok(())
}

#[test]
fn leaf_value_written_deep_is_read_back() -> anyhow::Result<()> {
    let mut elements = elements();
    resolver::write_value(&mut elements, &path("settings/limits/max"), json!(95))?;

    assert_that!(resolver::read_value(&elements, &path("settings/limits/max"))?)
        .is_equal_to(json!(95));

    Ok(())
}

#[test]
fn typed_values_are_unwrapped() -> anyhow::Result<()> {
    let mut elements = elements();
    let payload = json!({"valueType": "int", "value": 30});
    resolver::write_value(&mut elements, &path("temperature"), payload)?;

    assert_that!(resolver::read_value(&elements, &path("temperature"))?).is_equal_to(json!(30));

    Ok(())
}

#[test]
fn writing_below_missing_collection_errs() {
    let mut elements = elements();
    let result = resolver::write(
        &mut elements,
        &path("settings/missing/max"),
        Element::property("max", 1),
    );

    assert_that!(result).is_err_variant(Error::PathNotResolvable(String::new()));
}

#[test]
fn reading_through_property_errs() {
    assert_that!(resolver::read(&elements(), &path("temperature/unit")))
        .is_err_variant(Error::PathNotResolvable(String::new()));
}

#[test]
fn missing_target_is_not_found() {
    let mut elements = elements();

    assert_that!(resolver::read(&elements, &path("settings/missing")))
        .is_err_variant(Error::NotFound(String::new()));
    assert_that!(resolver::delete(&mut elements, &path("missing")))
        .is_err_variant(Error::NotFound(String::new()));
}

#[test]
fn written_elements_take_the_last_segment_as_name() -> anyhow::Result<()> {
    let mut elements = elements();
    resolver::write(
        &mut elements,
        &path("settings/limits/min"),
        Element::property("anything", 10),
    )?;

    assert_that!(resolver::read(&elements, &path("settings/limits/min"))?)
        .is_equal_to(&Element::property("min", 10));
    assert_that!(resolver::read_value(&elements, &path("settings/limits"))?)
        .is_equal_to(json!({"max": 80, "min": 10}));

    Ok(())
}

#[test]
fn deleted_elements_are_returned() -> anyhow::Result<()> {
    let mut elements = elements();
    let removed = resolver::delete(&mut elements, &path("settings/mode"))?;

    assert_that!(removed).is_equal_to(Element::property("mode", "auto"));
    assert_that!(resolver::read(&elements, &path("settings/mode")))
        .is_err_variant(Error::NotFound(String::new()));

    Ok(())
}

#[test]
fn operations_have_no_value() {
    let mut elements = elements();

    assert_that!(resolver::read_value(&elements, &path("reset")))
        .is_err_variant(Error::UnsupportedOperation(String::new()));
    assert_that!(resolver::write_value(&mut elements, &path("settings"), json!(1)))
        .is_err_variant(Error::UnsupportedOperation(String::new()));
}

#[test]
fn empty_paths_are_invalid() {
    assert_that!(ElementPath::parse("")).is_err_variant(Error::InvalidPath);
    assert_that!("/".parse::<ElementPath>()).is_err_variant(Error::InvalidPath);
}
