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

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::element::Element;
use super::reference::Reference;

/// The kind of value in an [`Identifier`].
///
/// [`Identifier`]: crate::model::Identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierType {
    #[serde(rename = "IRDI")]
    Irdi,
    #[serde(rename = "IRI")]
    Iri,
    Custom,
}

/// The globally unique identifier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub id_type: IdentifierType,
    pub id: String,
}

impl Identifier {
    /// Create an identifier of type `Custom`.
    pub fn custom(id: &str) -> Self {
        Identifier {
            id_type: IdentifierType::Custom,
            id: id.to_owned(),
        }
    }
}

/// A document which is stored as one object in a bucket.
///
/// The object key of a document is its identifier.
pub trait Document:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// A name for this kind of document used in messages.
    const KIND: &'static str;

    /// The durable identifier of this document.
    fn identifier(&self) -> &str;

    /// The human-readable short name of this document.
    fn id_short(&self) -> &str;

    /// The semantic ID of this document, if it has one.
    fn semantic_id(&self) -> Option<&Reference> {
        None
    }
}

/// The top-level document which refers to a set of submodels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shell {
    pub id_short: String,

    pub identification: Identifier,

    /// References to the submodels of this shell.
    #[serde(default)]
    pub submodels: Vec<Reference>,

    /// Every other member of the document, kept as is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Shell {
    /// Create a shell with a `Custom` identifier and no submodels.
    pub fn new(id_short: &str, identifier: &str) -> Self {
        Shell {
            id_short: id_short.to_owned(),
            identification: Identifier::custom(identifier),
            submodels: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Document for Shell {
    const KIND: &'static str = "shell";

    fn identifier(&self) -> &str {
        &self.identification.id
    }

    fn id_short(&self) -> &str {
        &self.id_short
    }
}

/// A document holding a tree of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submodel {
    pub id_short: String,

    pub identification: Identifier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<Reference>,

    /// The top-level elements of this submodel.
    #[serde(default)]
    pub submodel_elements: Vec<Element>,

    /// Every other member of the document, kept as is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Submodel {
    /// Create an empty submodel with a `Custom` identifier.
    pub fn new(id_short: &str, identifier: &str) -> Self {
        Submodel {
            id_short: id_short.to_owned(),
            identification: Identifier::custom(identifier),
            semantic_id: None,
            submodel_elements: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add `element` to the top level of this submodel.
    pub fn with_element(mut self, element: Element) -> Self {
        self.submodel_elements.push(element);
        self
    }

    pub fn with_semantic_id(mut self, semantic_id: Reference) -> Self {
        self.semantic_id = Some(semantic_id);
        self
    }
}

impl Document for Submodel {
    const KIND: &'static str = "submodel";

    fn identifier(&self) -> &str {
        &self.identification.id
    }

    fn id_short(&self) -> &str {
        &self.id_short
    }

    fn semantic_id(&self) -> Option<&Reference> {
        self.semantic_id.as_ref()
    }
}
