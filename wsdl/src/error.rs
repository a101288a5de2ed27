use thiserror::Error;

use crate::types::{EntityKind, QName};

/// Fatal parse failures. Every variant means the document is malformed and
/// no partial model is returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error parsing XML input")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("Document has no root element")]
    EmptyDocument,

    #[error("Document ends with unclosed element <{0}>")]
    UnclosedElement(String),

    #[error("Expected a wsdl:definitions root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("Unbound namespace prefix `{prefix}` in `{value}`")]
    UnboundPrefix { prefix: String, value: String },

    #[error("Duplicate {kind} `{name}`")]
    DuplicateEntity { kind: EntityKind, name: QName },
}

impl Error {
    pub fn is_malformed_document(&self) -> bool {
        true
    }
}
