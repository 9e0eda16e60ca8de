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

use chrono::Utc;

use crate::model::{Document, Reference};
use crate::store::ObjectMetadata;

/// The metadata tag holding the identifier of a document.
pub const IDENTIFIER_TAG: &str = "identifier";

/// The metadata tag holding the short name of a document.
pub const ID_SHORT_TAG: &str = "idShort";

/// The metadata tag holding the time a document was written.
pub const TIMESTAMP_TAG: &str = "timestamp";

/// The metadata tag holding the semantic ID of a submodel.
pub const SEMANTIC_ID_TAG: &str = "semanticId";

/// Serialize `document` as JSON.
///
/// # Errors
/// - `Error::Serialize`: The document could not be serialized.
pub fn serialize<D: Document>(document: &D) -> crate::Result<String> {
    serde_json::to_string(document).map_err(crate::Error::Serialize)
}

/// Deserialize a document from JSON.
///
/// # Errors
/// - `Error::Deserialize`: The bytes are not a valid document of type `D`.
pub fn deserialize<D: Document>(data: &[u8]) -> crate::Result<D> {
    serde_json::from_slice(data).map_err(crate::Error::Deserialize)
}

/// Format a reference the way it is stored in object metadata.
///
/// Each key becomes `type:<t>;value:<v>;idType:<i>` and the keys are joined with `/`.
pub fn format_reference(reference: &Reference) -> String {
    reference
        .keys
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// Derive the object metadata for `document`.
///
/// The metadata holds the identifier, the short name and the current time. The semantic ID is
/// only included if the document has one.
pub fn extract_metadata<D: Document>(document: &D) -> ObjectMetadata {
    let mut metadata = ObjectMetadata::new();
    metadata.insert(IDENTIFIER_TAG.to_owned(), document.identifier().to_owned());
    metadata.insert(ID_SHORT_TAG.to_owned(), document.id_short().to_owned());
    metadata.insert(
        TIMESTAMP_TAG.to_owned(),
        Utc::now().format("%Y%m%d%H%M%S%3f").to_string(),
    );
    if let Some(semantic_id) = document.semantic_id() {
        metadata.insert(SEMANTIC_ID_TAG.to_owned(), format_reference(semantic_id));
    }
    metadata
}

/// Look up `tag` in `metadata`, ignoring case.
///
/// S3 lower-cases the names of user metadata, so `idShort` comes back as `idshort`.
pub fn metadata_value<'a>(metadata: &'a ObjectMetadata, tag: &str) -> Option<&'a str> {
    metadata
        .get(tag)
        .or_else(|| {
            metadata
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(tag))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}
