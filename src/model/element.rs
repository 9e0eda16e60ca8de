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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reference::Reference;

/// A leaf element which holds a typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id_short: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<Reference>,

    /// The name of the value's type, like `int` or `string`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    #[serde(default)]
    pub value: Value,
}

/// An element which holds an ordered list of named child elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id_short: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<Reference>,

    #[serde(default)]
    pub value: Vec<Element>,
}

/// A leaf element describing an invocable operation.
///
/// Documents in an object store cannot run operations themselves. An operation can only be invoked
/// if it names an `invokable` target to delegate to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id_short: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<Reference>,

    /// The URL of the endpoint which runs this operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invokable: Option<String>,
}

/// A node in the element tree of a submodel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modelType")]
pub enum Element {
    Property(Property),
    #[serde(rename = "SubmodelElementCollection")]
    Collection(Collection),
    Operation(Operation),
}

impl Element {
    /// Create a property with a value and no value type.
    pub fn property(id_short: &str, value: impl Into<Value>) -> Self {
        Element::Property(Property {
            id_short: id_short.to_owned(),
            semantic_id: None,
            value_type: None,
            value: value.into(),
        })
    }

    /// Create a collection holding `children`.
    pub fn collection(id_short: &str, children: Vec<Element>) -> Self {
        Element::Collection(Collection {
            id_short: id_short.to_owned(),
            semantic_id: None,
            value: children,
        })
    }

    /// Create an operation which delegates to `invokable`, if given.
    pub fn operation(id_short: &str, invokable: Option<&str>) -> Self {
        Element::Operation(Operation {
            id_short: id_short.to_owned(),
            semantic_id: None,
            invokable: invokable.map(str::to_owned),
        })
    }

    pub fn id_short(&self) -> &str {
        match self {
            Element::Property(property) => &property.id_short,
            Element::Collection(collection) => &collection.id_short,
            Element::Operation(operation) => &operation.id_short,
        }
    }

    pub fn set_id_short(&mut self, id_short: &str) {
        let field = match self {
            Element::Property(property) => &mut property.id_short,
            Element::Collection(collection) => &mut collection.id_short,
            Element::Operation(operation) => &mut operation.id_short,
        };
        *field = id_short.to_owned();
    }

    /// The children of this element if it is a collection.
    pub fn children(&self) -> Option<&Vec<Element>> {
        match self {
            Element::Collection(collection) => Some(&collection.value),
            _ => None,
        }
    }

    /// The children of this element if it is a collection.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Collection(collection) => Some(&mut collection.value),
            _ => None,
        }
    }

    /// The name of this kind of element as it appears in documents.
    pub fn model_type(&self) -> &'static str {
        match self {
            Element::Property(_) => "Property",
            Element::Collection(_) => "SubmodelElementCollection",
            Element::Operation(_) => "Operation",
        }
    }
}
