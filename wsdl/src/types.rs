//! The cross-referenced service description model.
//!
//! Entities live in per-kind arenas on [`Definitions`] and point at each other
//! through typed indices. A [`Reference`] keeps the qualified name as written
//! alongside its [`Link`], which the resolver moves from `Pending` to either
//! `Resolved` or `Unresolved`.

use std::fmt;

pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/soap/";
pub const SOAP12_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/soap12/";
pub const HTTP_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/http/";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub namespace: Option<String>,
    pub name: String,
}

macro_rules! entity_id {
    ($($id:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $id(pub usize);
        )*
    };
}

entity_id!(
    ServiceId,
    BindingId,
    PortTypeId,
    MessageId,
    ComplexTypeId,
    SimpleTypeId,
    ElementId,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Service,
    Binding,
    PortType,
    Message,
    ComplexType,
    SimpleType,
    Element,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link<T> {
    /// Recorded by the builder, not yet looked at by the resolver.
    Pending,
    Resolved(T),
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<T> {
    pub name: QName,
    /// The attribute value as written, e.g. `xsd:string`.
    pub written: String,
    pub link: Link<T>,
}

/// Anything a `type`/`base` attribute can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTarget {
    Primitive(&'static str),
    Complex(ComplexTypeId),
    Simple(SimpleTypeId),
    Element(ElementId),
}

/// A top-level schema declaration, kept in document order across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Complex(ComplexTypeId),
    Simple(SimpleTypeId),
    Element(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: u32,
    pub max: MaxOccurs,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    /// `None` when the port has no `binding` attribute.
    pub binding: Option<Reference<BindingId>>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: QName,
    pub documentation: Option<String>,
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone)]
pub struct BindingOperation {
    pub name: String,
    pub action: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: QName,
    /// `None` when the binding has no `type` attribute.
    pub port_type: Option<Reference<PortTypeId>>,
    pub style: Option<String>,
    pub transport: Option<String>,
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone)]
pub struct Fault {
    pub name: Option<String>,
    pub message: Reference<MessageId>,
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub documentation: Option<String>,
    pub input: Option<Reference<MessageId>>,
    pub output: Option<Reference<MessageId>>,
    pub faults: Vec<Fault>,
}

#[derive(Debug, Clone)]
pub struct PortType {
    pub name: QName,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone)]
pub enum PartKind {
    Element(Reference<ElementId>),
    Type(Reference<TypeTarget>),
    /// Neither `element` nor `type` was given.
    Missing,
}

#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub kind: PartKind,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: QName,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Type(Reference<TypeTarget>),
    /// `<xsd:element ref="..."/>`
    Element(Reference<ElementId>),
    /// Anonymous complex type declared in place.
    Inline(Content),
    /// No type given, which XSD treats as `anyType`.
    Untyped,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub occurs: Occurs,
    pub nillable: bool,
    pub attribute: bool,
    pub documentation: Option<String>,
}

/// The body of a complex type: an optional derivation base and its fields in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub base: Option<Reference<TypeTarget>>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct ComplexType {
    pub name: QName,
    pub documentation: Option<String>,
    pub content: Content,
}

#[derive(Debug, Clone)]
pub struct SimpleType {
    pub name: QName,
    pub documentation: Option<String>,
    pub base: Option<Reference<TypeTarget>>,
    pub enumeration: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Inline(Content),
    Type(Reference<TypeTarget>),
    Untyped,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: QName,
    pub documentation: Option<String>,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnresolvedReference {
        kind: EntityKind,
        target: QName,
        referrer: String,
    },
    UnrecognizedElement {
        parent: String,
        element: QName,
    },
    MissingPartReference {
        message: String,
        part: String,
    },
    MissingReference {
        referrer: String,
        attribute: &'static str,
    },
    ConflictingPartReference {
        message: String,
        part: String,
    },
    InvalidOccurs {
        field: String,
        value: String,
    },
    ImportNotFollowed {
        namespace: Option<String>,
        location: Option<String>,
    },
}

#[derive(Default, Debug, Clone)]
pub struct Definitions {
    pub name: Option<String>,
    pub target_namespace: Option<String>,
    /// Prefix declarations on the root element, in source order.
    pub namespaces: Vec<(Option<String>, String)>,

    pub services: Vec<Service>,
    pub bindings: Vec<Binding>,
    pub port_types: Vec<PortType>,
    pub messages: Vec<Message>,
    pub complex_types: Vec<ComplexType>,
    pub simple_types: Vec<SimpleType>,
    pub elements: Vec<Element>,
    pub declarations: Vec<Declaration>,

    pub diagnostics: Vec<Diagnostic>,
    /// Elements skipped because the builder has no meaning for them.
    pub unrecognized: usize,
}

impl QName {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(ToOwned::to_owned),
            name: name.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{{{}}}{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Service => "service",
            Self::Binding => "binding",
            Self::PortType => "port type",
            Self::Message => "message",
            Self::ComplexType => "complex type",
            Self::SimpleType => "simple type",
            Self::Element => "element",
            Self::Type => "type",
        })
    }
}

impl<T> Link<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(target) => Some(target),
            _ => None,
        }
    }
}

impl<T> Reference<T> {
    pub fn new(name: QName, written: &str) -> Self {
        Self {
            name,
            written: written.trim().to_owned(),
            link: Link::Pending,
        }
    }

    pub fn target(&self) -> Option<&T> {
        self.link.resolved()
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.link, Link::Unresolved)
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self {
            min: 1,
            max: MaxOccurs::Bounded(1),
        }
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{}", max),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedReference {
                kind,
                target,
                referrer,
            } => write!(f, "{} references unknown {} {}", referrer, kind, target),
            Self::UnrecognizedElement { parent, element } => {
                write!(f, "skipped unrecognized {} inside {}", element, parent)
            }
            Self::MissingPartReference { message, part } => write!(
                f,
                "part {} of message {} has neither element nor type",
                part, message
            ),
            Self::MissingReference {
                referrer,
                attribute,
            } => write!(f, "{} has no {} attribute", referrer, attribute),
            Self::ConflictingPartReference { message, part } => write!(
                f,
                "part {} of message {} has both element and type; using element",
                part, message
            ),
            Self::InvalidOccurs { field, value } => {
                write!(f, "field {} has invalid occurrence bound `{}`", field, value)
            }
            Self::ImportNotFollowed {
                namespace,
                location,
            } => write!(
                f,
                "import of {} from {} was not followed",
                namespace.as_deref().unwrap_or("(no namespace)"),
                location.as_deref().unwrap_or("(no location)")
            ),
        }
    }
}

/// Built-in XSD datatypes, which resolve to [`TypeTarget::Primitive`].
pub const XSD_PRIMITIVES: &[&str] = &[
    "anyType",
    "anySimpleType",
    "anyURI",
    "base64Binary",
    "boolean",
    "byte",
    "date",
    "dateTime",
    "decimal",
    "double",
    "duration",
    "ENTITIES",
    "ENTITY",
    "float",
    "gDay",
    "gMonth",
    "gMonthDay",
    "gYear",
    "gYearMonth",
    "hexBinary",
    "ID",
    "IDREF",
    "IDREFS",
    "int",
    "integer",
    "language",
    "long",
    "Name",
    "NCName",
    "negativeInteger",
    "NMTOKEN",
    "NMTOKENS",
    "nonNegativeInteger",
    "nonPositiveInteger",
    "normalizedString",
    "NOTATION",
    "positiveInteger",
    "QName",
    "short",
    "string",
    "time",
    "token",
    "unsignedByte",
    "unsignedInt",
    "unsignedLong",
    "unsignedShort",
];

pub fn primitive(name: &QName) -> Option<&'static str> {
    if name.namespace.as_deref() != Some(XSD_NAMESPACE) {
        return None;
    }

    XSD_PRIMITIVES
        .iter()
        .copied()
        .find(|primitive| *primitive == name.name)
}

fn ordinal<'a>(names: impl Iterator<Item = &'a str>, position: usize) -> usize {
    let names: Vec<_> = names.take(position + 1).collect();

    match names.split_last() {
        Some((name, earlier)) => earlier.iter().filter(|earlier| *earlier == name).count(),
        None => 0,
    }
}

impl PortType {
    /// How many earlier operations share the name of the one at `position`.
    pub fn overload_ordinal(&self, position: usize) -> usize {
        ordinal(
            self.operations.iter().map(|operation| operation.name.as_str()),
            position,
        )
    }

    pub fn is_overloaded(&self, name: &str) -> bool {
        self.operations
            .iter()
            .filter(|operation| operation.name == name)
            .count()
            > 1
    }

    /// Position of the `ordinal`th operation called `name`.
    pub fn overload(&self, name: &str, ordinal: usize) -> Option<usize> {
        self.operations
            .iter()
            .enumerate()
            .filter(|(_, operation)| operation.name == name)
            .nth(ordinal)
            .map(|(position, _)| position)
    }
}

impl Binding {
    pub fn overload_ordinal(&self, position: usize) -> usize {
        ordinal(
            self.operations.iter().map(|operation| operation.name.as_str()),
            position,
        )
    }

    /// The `ordinal`th binding operation called `name`.
    pub fn operation(&self, name: &str, ordinal: usize) -> Option<&BindingOperation> {
        self.operations
            .iter()
            .filter(|operation| operation.name == name)
            .nth(ordinal)
    }
}

impl Definitions {
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0]
    }

    pub fn port_type(&self, id: PortTypeId) -> &PortType {
        &self.port_types[id.0]
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.0]
    }

    pub fn complex_type(&self, id: ComplexTypeId) -> &ComplexType {
        &self.complex_types[id.0]
    }

    pub fn simple_type(&self, id: SimpleTypeId) -> &SimpleType {
        &self.simple_types[id.0]
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Bindings whose port type reference landed on `port_type`.
    pub fn bindings_for(&self, port_type: PortTypeId) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter().filter(move |binding| {
            binding.port_type.as_ref().and_then(Reference::target) == Some(&port_type)
        })
    }

    /// The first non-empty SOAPAction any binding of `port_type` declares for
    /// the operation at `position`. Overloads are matched by their ordinal
    /// among operations sharing the name.
    pub fn soap_action(&self, port_type: PortTypeId, position: usize) -> Option<&str> {
        let declared = self.port_type(port_type);
        let operation = declared.operations.get(position)?;
        let ordinal = declared.overload_ordinal(position);

        self.bindings_for(port_type)
            .filter_map(|binding| binding.operation(&operation.name, ordinal))
            .find_map(|binding_operation| {
                binding_operation
                    .action
                    .as_deref()
                    .filter(|action| !action.is_empty())
            })
    }

    pub fn unresolved_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| matches!(diagnostic, Diagnostic::UnresolvedReference { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn occurs_display_uses_unbounded_marker() {
        let occurs = Occurs {
            min: 0,
            max: MaxOccurs::Unbounded,
        };

        assert_eq!(occurs.to_string(), "0..unbounded");
        assert_eq!(Occurs::default().to_string(), "1..1");
    }

    #[test]
    fn primitives_only_live_in_the_xsd_namespace() {
        assert_eq!(
            primitive(&QName::new(Some(XSD_NAMESPACE), "dateTime")),
            Some("dateTime")
        );
        assert_eq!(primitive(&QName::new(Some("urn:other"), "string")), None);
        assert_eq!(primitive(&QName::new(Some(XSD_NAMESPACE), "Widget")), None);
    }

    fn operation(name: &str) -> Operation {
        Operation {
            name: name.into(),
            documentation: None,
            input: None,
            output: None,
            faults: Vec::new(),
        }
    }

    #[test]
    fn overloads_are_numbered_in_document_order() {
        let port_type = PortType {
            name: QName::new(Some("urn:x"), "P"),
            operations: vec![operation("Op"), operation("Other"), operation("Op")],
        };

        assert_eq!(port_type.overload_ordinal(0), 0);
        assert_eq!(port_type.overload_ordinal(1), 0);
        assert_eq!(port_type.overload_ordinal(2), 1);
        assert!(port_type.is_overloaded("Op"));
        assert!(!port_type.is_overloaded("Other"));
        assert_eq!(port_type.overload("Op", 1), Some(2));
        assert_eq!(port_type.overload("Op", 2), None);
    }

    #[test]
    fn references_start_pending() {
        let reference: Reference<MessageId> =
            Reference::new(QName::new(Some("urn:x"), "Ping"), " tns:Ping ");

        assert_eq!(reference.link, Link::Pending);
        assert_eq!(reference.written, "tns:Ping");
        assert_eq!(reference.target(), None);
        assert!(!reference.is_unresolved());
    }
}
