//! Parses a WSDL 1.1 document with its embedded XSD schemas into a fully
//! cross-referenced [`types::Definitions`] model.
//!
//! ```
//! let source = r#"<definitions targetNamespace="urn:ping"
//!     xmlns="http://schemas.xmlsoap.org/wsdl/" xmlns:tns="urn:ping"
//!     xmlns:xsd="http://www.w3.org/2001/XMLSchema">
//!   <message name="Ping"><part name="id" type="xsd:int"/></message>
//! </definitions>"#;
//!
//! let definitions = suds_wsdl::parse(source).unwrap();
//! assert_eq!(definitions.messages[0].name.name, "Ping");
//! ```

mod parser;
mod resolver;

pub mod error;
pub mod types;
pub mod xml;

/// Builds the model from document text and resolves its references.
///
/// Fails only on malformed input; unresolved references and unknown
/// elements are recorded on [`types::Definitions::diagnostics`].
pub fn parse<S: AsRef<str>>(source: S) -> Result<types::Definitions, error::Error> {
    let document = xml::Document::parse(source.as_ref())?;
    let mut definitions = parser::build(&document)?;
    resolver::resolve(&mut definitions)?;

    tracing::debug!(
        services = definitions.services.len(),
        messages = definitions.messages.len(),
        diagnostics = definitions.diagnostics.len(),
        "parsed definitions"
    );

    Ok(definitions)
}
