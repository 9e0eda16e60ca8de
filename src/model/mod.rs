//! The document model stored by this crate.
//!
//! Only the parts of the document metamodel which the storage layer works with are typed here:
//! identifiers, short names, references and the element tree. Every other member of a document is
//! carried through unchanged.

pub use self::document::{Document, Identifier, IdentifierType, Shell, Submodel};
pub use self::element::{Collection, Element, Operation, Property};
pub use self::path::ElementPath;
pub use self::reference::{Key, KeyIdType, Reference, ReferenceTarget};

mod document;
mod element;
mod path;
mod reference;
