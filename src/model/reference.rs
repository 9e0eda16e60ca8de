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

use serde::{Deserialize, Serialize};

/// The kind of value held by a [`Key`].
///
/// [`Key`]: crate::model::Key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyIdType {
    #[serde(rename = "IRDI")]
    Irdi,
    #[serde(rename = "IRI")]
    Iri,
    Custom,
    IdShort,
    FragmentId,
}

impl KeyIdType {
    /// The name of this type as it appears in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyIdType::Irdi => "IRDI",
            KeyIdType::Iri => "IRI",
            KeyIdType::Custom => "Custom",
            KeyIdType::IdShort => "IdShort",
            KeyIdType::FragmentId => "FragmentId",
        }
    }
}

impl fmt::Display for KeyIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a [`Reference`].
///
/// [`Reference`]: crate::model::Reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    /// The kind of entity this key points at, like `Submodel` or `ConceptDescription`.
    #[serde(rename = "type")]
    pub key_type: String,

    /// Whether the entity is in the same environment as the referring document.
    #[serde(default)]
    pub local: bool,

    /// The identifier or short name of the entity.
    pub value: String,

    /// Whether `value` is an identifier or a short name.
    pub id_type: KeyIdType,
}

impl Key {
    /// Create a local key of the given type.
    pub fn new(key_type: &str, value: &str, id_type: KeyIdType) -> Self {
        Key {
            key_type: key_type.to_owned(),
            local: true,
            value: value.to_owned(),
            id_type,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type:{};value:{};idType:{}",
            self.key_type, self.value, self.id_type
        )
    }
}

/// What the last key of a [`Reference`] designates.
///
/// [`Reference`]: crate::model::Reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTarget<'a> {
    /// The durable identifier of a document.
    Identifier(&'a str),

    /// The short name of a document, which has to be looked up.
    ShortName(&'a str),
}

/// A chain of keys pointing at an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// The keys, from the outermost entity to the target.
    #[serde(default)]
    pub keys: Vec<Key>,
}

impl Reference {
    /// Create a reference from its keys.
    pub fn new(keys: Vec<Key>) -> Self {
        Reference { keys }
    }

    /// A reference to the submodel with the given `identifier`.
    pub fn submodel(identifier: &str) -> Self {
        Reference::new(vec![Key::new("Submodel", identifier, KeyIdType::Custom)])
    }

    /// A reference to the submodel with the given `short_name`.
    pub fn submodel_short_name(short_name: &str) -> Self {
        Reference::new(vec![Key::new("Submodel", short_name, KeyIdType::IdShort)])
    }

    /// The key which designates the target, if there are any keys.
    pub fn last_key(&self) -> Option<&Key> {
        self.keys.last()
    }

    /// What this reference points at, or `None` if it has no keys.
    pub fn target(&self) -> Option<ReferenceTarget<'_>> {
        self.last_key().map(|key| match key.id_type {
            KeyIdType::IdShort => ReferenceTarget::ShortName(&key.value),
            _ => ReferenceTarget::Identifier(&key.value),
        })
    }
}
