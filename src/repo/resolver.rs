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

//! Path-based access to the element tree of a submodel.
//!
//! These functions work on the top-level element list of a document in memory. Persisting the
//! result is up to the caller, which always rewrites the whole document.

use serde_json::{Map, Value};

use crate::model::{Element, ElementPath};

fn unresolvable(path: &ElementPath, depth: usize, reason: &str) -> crate::Error {
    let prefix = path.segments()[..=depth].join("/");
    crate::Error::PathNotResolvable(format!("'{}' in '{}' {}", prefix, path, reason))
}

fn not_found(path: &ElementPath) -> crate::Error {
    crate::Error::NotFound(format!("element '{}'", path))
}

/// Return the children of the collection which holds the target of `path`.
fn parent<'a>(elements: &'a [Element], path: &ElementPath) -> crate::Result<&'a [Element]> {
    let mut current = elements;
    for (depth, segment) in path.parent().iter().enumerate() {
        let element = current
            .iter()
            .find(|element| element.id_short() == segment.as_str())
            .ok_or_else(|| unresolvable(path, depth, "does not exist"))?;
        current = element
            .children()
            .ok_or_else(|| unresolvable(path, depth, "is not a collection"))?;
    }
    Ok(current)
}

fn parent_mut<'a>(
    elements: &'a mut Vec<Element>,
    path: &ElementPath,
) -> crate::Result<&'a mut Vec<Element>> {
    let mut current = elements;
    for (depth, segment) in path.parent().iter().enumerate() {
        let element = current
            .iter_mut()
            .find(|element| element.id_short() == segment.as_str())
            .ok_or_else(|| unresolvable(path, depth, "does not exist"))?;
        current = element
            .children_mut()
            .ok_or_else(|| unresolvable(path, depth, "is not a collection"))?;
    }
    Ok(current)
}

fn find_mut<'a>(elements: &'a mut Vec<Element>, path: &ElementPath) -> crate::Result<&'a mut Element> {
    parent_mut(elements, path)?
        .iter_mut()
        .find(|element| element.id_short() == path.name())
        .ok_or_else(|| not_found(path))
}

/// Return the element at `path`.
///
/// # Errors
/// - `Error::PathNotResolvable`: An element on the way to the target is missing or is not a
/// collection.
/// - `Error::NotFound`: The target element does not exist.
pub fn read<'a>(elements: &'a [Element], path: &ElementPath) -> crate::Result<&'a Element> {
    parent(elements, path)?
        .iter()
        .find(|element| element.id_short() == path.name())
        .ok_or_else(|| not_found(path))
}

/// Put `element` at `path`.
///
/// The element's short name is set to the last segment of `path`. If the parent collection
/// already has an element with that name, it is replaced in place; otherwise the element is
/// appended.
///
/// # Errors
/// - `Error::PathNotResolvable`: An element on the way to the parent is missing or is not a
/// collection.
pub fn write(elements: &mut Vec<Element>, path: &ElementPath, mut element: Element) -> crate::Result<()> {
    element.set_id_short(path.name());
    let siblings = parent_mut(elements, path)?;
    match siblings
        .iter_mut()
        .find(|sibling| sibling.id_short() == path.name())
    {
        Some(existing) => *existing = element,
        None => siblings.push(element),
    }
    Ok(())
}

/// Remove the element at `path` and return it.
///
/// # Errors
/// - `Error::PathNotResolvable`: An element on the way to the target is missing or is not a
/// collection.
/// - `Error::NotFound`: The target element does not exist.
pub fn delete(elements: &mut Vec<Element>, path: &ElementPath) -> crate::Result<Element> {
    let siblings = parent_mut(elements, path)?;
    let position = siblings
        .iter()
        .position(|element| element.id_short() == path.name())
        .ok_or_else(|| not_found(path))?;
    Ok(siblings.remove(position))
}

/// The value of `element`.
///
/// The value of a collection maps the short name of each child to the child's value.
fn value_of(element: &Element, path: &ElementPath) -> crate::Result<Value> {
    match element {
        Element::Property(property) => Ok(property.value.clone()),
        Element::Collection(collection) => {
            let mut values = Map::new();
            for child in &collection.value {
                let child_path = path.join(child.id_short())?;
                values.insert(child.id_short().to_owned(), value_of(child, &child_path)?);
            }
            Ok(Value::Object(values))
        }
        Element::Operation(_) => Err(crate::Error::UnsupportedOperation(format!(
            "the operation '{}' has no value",
            path
        ))),
    }
}

/// Return the value of the element at `path`.
///
/// # Errors
/// - `Error::PathNotResolvable`: An element on the way to the target is missing or is not a
/// collection.
/// - `Error::NotFound`: The target element does not exist.
/// - `Error::UnsupportedOperation`: The target is an operation.
pub fn read_value(elements: &[Element], path: &ElementPath) -> crate::Result<Value> {
    value_of(read(elements, path)?, path)
}

/// Strip the type annotation from a `{"valueType": ..., "value": ...}` payload.
///
/// Anything else is returned unchanged.
pub fn unwrap_value(value: Value) -> Value {
    match value {
        Value::Object(mut members)
            if members.get("valueType").map_or(false, |value_type| !value_type.is_null())
                && members.contains_key("value") =>
        {
            members.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Set the value of the property at `path`.
///
/// A typed payload of the form `{"valueType": ..., "value": ...}` is unwrapped first, so only its
/// `value` member is stored.
///
/// # Errors
/// - `Error::PathNotResolvable`: An element on the way to the target is missing or is not a
/// collection.
/// - `Error::NotFound`: The target element does not exist.
/// - `Error::UnsupportedOperation`: The target is not a property.
pub fn write_value(elements: &mut Vec<Element>, path: &ElementPath, value: Value) -> crate::Result<()> {
    match find_mut(elements, path)? {
        Element::Property(property) => {
            property.value = unwrap_value(value);
            Ok(())
        }
        other => Err(crate::Error::UnsupportedOperation(format!(
            "cannot assign a value to the {} '{}'",
            other.model_type(),
            path
        ))),
    }
}
