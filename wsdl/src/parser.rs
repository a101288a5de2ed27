use tracing::debug;

use super::{
    error::Error,
    types::{
        Binding, BindingOperation, ComplexType, ComplexTypeId, Content, Declaration, Definitions,
        Diagnostic, Element, ElementId, ElementKind, Fault, Field, FieldKind, MaxOccurs, Message,
        Occurs, Operation, Part, PartKind, Port, PortType, QName, Reference, Service, SimpleType,
        SimpleTypeId, HTTP_NAMESPACE, SOAP12_NAMESPACE, SOAP_NAMESPACE, WSDL_NAMESPACE,
        XSD_NAMESPACE,
    },
    xml::{Document, Node},
};

const FACETS: &[&str] = &[
    "enumeration",
    "fractionDigits",
    "length",
    "maxExclusive",
    "maxInclusive",
    "maxLength",
    "minExclusive",
    "minInclusive",
    "minLength",
    "pattern",
    "totalDigits",
    "whiteSpace",
];

fn get_attributes<'a, const N: usize>(
    node: Node<'a>,
    names: [&'static str; N],
) -> [Option<&'a str>; N] {
    names.map(|name| node.attribute(name))
}

fn describe(node: Node<'_>) -> String {
    match node.attribute("name") {
        Some(name) => format!("{} {}", node.local_name(), name),
        None => node.local_name().to_owned(),
    }
}

fn local_part(written: &str) -> &str {
    written.rsplit(':').next().unwrap_or(written)
}

fn is_soap(node: Node<'_>, local_name: &str) -> bool {
    node.is(SOAP_NAMESPACE, local_name) || node.is(SOAP12_NAMESPACE, local_name)
}

fn wsdl_documentation(node: Node<'_>) -> Option<String> {
    node.child(WSDL_NAMESPACE, "documentation")
        .map(|documentation| documentation.text())
        .filter(|text| !text.is_empty())
}

fn xsd_documentation(node: Node<'_>) -> Option<String> {
    node.child(XSD_NAMESPACE, "annotation")
        .and_then(|annotation| annotation.child(XSD_NAMESPACE, "documentation"))
        .map(|documentation| documentation.text())
        .filter(|text| !text.is_empty())
}

struct Parser {
    definitions: Definitions,
}

impl Parser {
    fn new() -> Self {
        Self {
            definitions: Default::default(),
        }
    }

    fn target_namespaced(&self, name: &str) -> QName {
        QName::new(self.definitions.target_namespace.as_deref(), name)
    }

    fn reference<T>(&self, node: Node<'_>, written: &str) -> Result<Reference<T>, Error> {
        Ok(Reference::new(node.resolve_qname(written)?, written))
    }

    fn unrecognized(&mut self, parent: Node<'_>, child: Node<'_>) {
        self.definitions.unrecognized += 1;
        self.note(Diagnostic::UnrecognizedElement {
            parent: describe(parent),
            element: child.qname(),
        });
    }

    fn note(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.definitions.diagnostics.push(diagnostic);
    }

    fn parse(mut self, document: &Document) -> Result<Definitions, Error> {
        let root = document.root();

        if !root.is(WSDL_NAMESPACE, "definitions") {
            return Err(Error::UnexpectedRoot(root.qname().to_string()));
        }

        // Prefixes and the target namespace come first: everything below
        // may rely on them.
        self.definitions.name = root.attribute("name").map(ToOwned::to_owned);
        self.definitions.target_namespace = root
            .attribute("targetNamespace")
            .map(ToOwned::to_owned);
        self.definitions.namespaces = root.namespace_declarations().to_vec();

        debug!(
            target_namespace = ?self.definitions.target_namespace,
            "parsing definitions"
        );

        for child in root.children() {
            if child.namespace() != Some(WSDL_NAMESPACE) {
                self.unrecognized(root, child);
                continue;
            }

            match child.local_name() {
                "documentation" => (),
                "import" => self.parse_import(child),
                "types" => self.parse_types(child)?,
                "message" => self.parse_message(root, child)?,
                "portType" => self.parse_port_type(root, child)?,
                "binding" => self.parse_binding(root, child)?,
                "service" => self.parse_service(root, child)?,
                _ => self.unrecognized(root, child),
            }
        }

        Ok(self.definitions)
    }

    fn parse_import(&mut self, node: Node<'_>) {
        let [namespace, location, schema_location] =
            get_attributes(node, ["namespace", "location", "schemaLocation"]);

        self.note(Diagnostic::ImportNotFollowed {
            namespace: namespace.map(ToOwned::to_owned),
            location: location.or(schema_location).map(ToOwned::to_owned),
        });
    }

    fn parse_message(&mut self, parent: Node<'_>, node: Node<'_>) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let mut parts = Vec::new();

        for child in node.children() {
            if child.is(WSDL_NAMESPACE, "part") {
                parts.push(self.parse_part(name, child)?);
            } else if !child.is(WSDL_NAMESPACE, "documentation") {
                self.unrecognized(node, child);
            }
        }

        let name = self.target_namespaced(name);
        self.definitions.messages.push(Message { name, parts });
        Ok(())
    }

    fn parse_part(&mut self, message: &str, node: Node<'_>) -> Result<Part, Error> {
        let [name, element, ty] = get_attributes(node, ["name", "element", "type"]);
        let name = name.unwrap_or_default().to_owned();

        let kind = match (element, ty) {
            (Some(element), ty) => {
                if ty.is_some() {
                    self.note(Diagnostic::ConflictingPartReference {
                        message: message.to_owned(),
                        part: name.clone(),
                    });
                }

                PartKind::Element(self.reference(node, element)?)
            }

            (None, Some(ty)) => PartKind::Type(self.reference(node, ty)?),

            (None, None) => {
                self.note(Diagnostic::MissingPartReference {
                    message: message.to_owned(),
                    part: name.clone(),
                });

                PartKind::Missing
            }
        };

        Ok(Part { name, kind })
    }

    fn parse_port_type(&mut self, parent: Node<'_>, node: Node<'_>) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let mut operations = Vec::new();

        for child in node.children() {
            if child.is(WSDL_NAMESPACE, "operation") {
                operations.push(self.parse_operation(node, child)?);
            } else if !child.is(WSDL_NAMESPACE, "documentation") {
                self.unrecognized(node, child);
            }
        }

        let name = self.target_namespaced(name);
        self.definitions
            .port_types
            .push(PortType { name, operations });
        Ok(())
    }

    fn parse_operation(&mut self, parent: Node<'_>, node: Node<'_>) -> Result<Operation, Error> {
        let mut operation = Operation {
            name: node.attribute_or("name", "").to_owned(),
            documentation: wsdl_documentation(node),
            input: None,
            output: None,
            faults: Vec::new(),
        };

        for child in node.children() {
            if child.namespace() != Some(WSDL_NAMESPACE) {
                self.unrecognized(node, child);
                continue;
            }

            let message = match child.attribute("message") {
                Some(message) => Some(self.reference(child, message)?),
                None => None,
            };

            match child.local_name() {
                "documentation" => (),
                "input" => operation.input = message,
                "output" => operation.output = message,
                "fault" => match message {
                    Some(message) => operation.faults.push(Fault {
                        name: child.attribute("name").map(ToOwned::to_owned),
                        message,
                    }),
                    None => self.unrecognized(node, child),
                },
                _ => self.unrecognized(node, child),
            }
        }

        debug!(port_type = %describe(parent), operation = %operation.name, "parsed operation");
        Ok(operation)
    }

    fn parse_binding(&mut self, parent: Node<'_>, node: Node<'_>) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let port_type = match node.attribute("type") {
            Some(ty) => Some(self.reference(node, ty)?),
            None => {
                self.note(Diagnostic::MissingReference {
                    referrer: format!("binding {}", name),
                    attribute: "type",
                });
                None
            }
        };

        let mut binding = Binding {
            name: self.target_namespaced(name),
            port_type,
            style: None,
            transport: None,
            operations: Vec::new(),
        };

        for child in node.children() {
            if is_soap(child, "binding") {
                binding.style = child.attribute("style").map(ToOwned::to_owned);
                binding.transport = child.attribute("transport").map(ToOwned::to_owned);
            } else if child.is(WSDL_NAMESPACE, "operation") {
                let operation = self.parse_binding_operation(child);
                binding.operations.push(operation);
            } else if !child.is(HTTP_NAMESPACE, "binding")
                && !child.is(WSDL_NAMESPACE, "documentation")
            {
                self.unrecognized(node, child);
            }
        }

        self.definitions.bindings.push(binding);
        Ok(())
    }

    fn parse_binding_operation(&mut self, node: Node<'_>) -> BindingOperation {
        let mut operation = BindingOperation {
            name: node.attribute_or("name", "").to_owned(),
            action: None,
            style: None,
        };

        for child in node.children() {
            if is_soap(child, "operation") {
                let [action, style] = get_attributes(child, ["soapAction", "style"]);
                operation.action = action.map(ToOwned::to_owned);
                operation.style = style.map(ToOwned::to_owned);
            } else {
                let known = child.namespace() == Some(WSDL_NAMESPACE)
                    && matches!(
                        child.local_name(),
                        "input" | "output" | "fault" | "documentation"
                    );

                if !known && !child.is(HTTP_NAMESPACE, "operation") {
                    self.unrecognized(node, child);
                }
            }
        }

        operation
    }

    fn parse_service(&mut self, parent: Node<'_>, node: Node<'_>) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let mut ports = Vec::new();

        for child in node.children() {
            if child.is(WSDL_NAMESPACE, "port") {
                ports.push(self.parse_port(name, child)?);
            } else if !child.is(WSDL_NAMESPACE, "documentation") {
                self.unrecognized(node, child);
            }
        }

        let service = Service {
            name: self.target_namespaced(name),
            documentation: wsdl_documentation(node),
            ports,
        };

        self.definitions.services.push(service);
        Ok(())
    }

    fn parse_port(&mut self, service: &str, node: Node<'_>) -> Result<Port, Error> {
        let [name, binding] = get_attributes(node, ["name", "binding"]);
        let name = name.unwrap_or_default();

        let binding = match binding {
            Some(binding) => Some(self.reference(node, binding)?),
            None => {
                self.note(Diagnostic::MissingReference {
                    referrer: format!("port {} of service {}", name, service),
                    attribute: "binding",
                });
                None
            }
        };

        let mut address = None;

        for child in node.children() {
            if is_soap(child, "address") || child.is(HTTP_NAMESPACE, "address") {
                address = child.attribute("location").map(ToOwned::to_owned);
            } else if !child.is(WSDL_NAMESPACE, "documentation") {
                self.unrecognized(node, child);
            }
        }

        Ok(Port {
            name: name.to_owned(),
            binding,
            address,
        })
    }

    fn parse_types(&mut self, node: Node<'_>) -> Result<(), Error> {
        for child in node.children() {
            if child.is(XSD_NAMESPACE, "schema") {
                self.parse_schema(child)?;
            } else if !child.is(WSDL_NAMESPACE, "documentation") {
                self.unrecognized(node, child);
            }
        }

        Ok(())
    }

    fn parse_schema(&mut self, node: Node<'_>) -> Result<(), Error> {
        let namespace = node.attribute("targetNamespace");
        debug!(?namespace, "parsing schema");

        for child in node.children() {
            if child.namespace() != Some(XSD_NAMESPACE) {
                self.unrecognized(node, child);
                continue;
            }

            match child.local_name() {
                "annotation" => (),
                "import" | "include" | "redefine" => self.parse_import(child),
                "element" => self.parse_element(namespace, node, child)?,
                "complexType" => self.parse_complex_type(namespace, node, child)?,
                "simpleType" => self.parse_simple_type(namespace, node, child)?,
                _ => self.unrecognized(node, child),
            }
        }

        Ok(())
    }

    fn parse_element(
        &mut self,
        namespace: Option<&str>,
        parent: Node<'_>,
        node: Node<'_>,
    ) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let inline = node.child(XSD_NAMESPACE, "complexType");

        let kind = if let Some(ty) = node.attribute("type") {
            ElementKind::Type(self.reference(node, ty)?)
        } else if let Some(inline) = inline {
            ElementKind::Inline(self.parse_members(name, inline)?)
        } else if let Some(base) = self.simple_base(node)? {
            ElementKind::Type(base)
        } else {
            ElementKind::Untyped
        };

        let documentation = xsd_documentation(node).or_else(|| inline.and_then(xsd_documentation));

        let id = ElementId(self.definitions.elements.len());
        self.definitions.declarations.push(Declaration::Element(id));
        self.definitions.elements.push(Element {
            name: QName::new(namespace, name),
            documentation,
            kind,
        });

        Ok(())
    }

    fn parse_complex_type(
        &mut self,
        namespace: Option<&str>,
        parent: Node<'_>,
        node: Node<'_>,
    ) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let content = self.parse_members(name, node)?;

        let id = ComplexTypeId(self.definitions.complex_types.len());
        self.definitions.declarations.push(Declaration::Complex(id));
        self.definitions.complex_types.push(ComplexType {
            name: QName::new(namespace, name),
            documentation: xsd_documentation(node),
            content,
        });

        Ok(())
    }

    fn parse_simple_type(
        &mut self,
        namespace: Option<&str>,
        parent: Node<'_>,
        node: Node<'_>,
    ) -> Result<(), Error> {
        let name = if let Some(name) = node.attribute("name") {
            name
        } else {
            self.unrecognized(parent, node);
            return Ok(());
        };

        let restriction = node.child(XSD_NAMESPACE, "restriction");

        let base = match restriction
            .and_then(|restriction| restriction.attribute("base").map(|base| (restriction, base)))
        {
            Some((restriction, base)) => Some(self.reference(restriction, base)?),
            None => None,
        };

        let enumeration = restriction
            .map(|restriction| {
                restriction
                    .children_named(XSD_NAMESPACE, "enumeration")
                    .filter_map(|value| value.attribute("value"))
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let id = SimpleTypeId(self.definitions.simple_types.len());
        self.definitions.declarations.push(Declaration::Simple(id));
        self.definitions.simple_types.push(SimpleType {
            name: QName::new(namespace, name),
            documentation: xsd_documentation(node),
            base,
            enumeration,
        });

        Ok(())
    }

    /// The restriction base of an anonymous `simpleType` child, if any.
    fn simple_base<T>(&self, node: Node<'_>) -> Result<Option<Reference<T>>, Error> {
        let restriction = node
            .child(XSD_NAMESPACE, "simpleType")
            .and_then(|simple| simple.child(XSD_NAMESPACE, "restriction"));

        match restriction {
            Some(restriction) => match restriction.attribute("base") {
                Some(base) => Ok(Some(self.reference(restriction, base)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// Collects the fields of a complex type body, following
    /// `complexContent`/`simpleContent` derivations and flattening nested
    /// compositors in document order.
    fn parse_members(&mut self, owner: &str, node: Node<'_>) -> Result<Content, Error> {
        let mut content = Content::default();
        self.collect_members(owner, node, &mut content)?;
        Ok(content)
    }

    fn collect_members(
        &mut self,
        owner: &str,
        node: Node<'_>,
        content: &mut Content,
    ) -> Result<(), Error> {
        for child in node.children() {
            if child.namespace() != Some(XSD_NAMESPACE) {
                self.unrecognized(node, child);
                continue;
            }

            match child.local_name() {
                "sequence" | "all" | "choice" => {
                    self.collect_particles(owner, child, &mut content.fields)?
                }

                "complexContent" | "simpleContent" => {
                    for derivation in child.children() {
                        if derivation.is(XSD_NAMESPACE, "extension")
                            || derivation.is(XSD_NAMESPACE, "restriction")
                        {
                            if let Some(base) = derivation.attribute("base") {
                                content.base = Some(self.reference(derivation, base)?);
                            }

                            self.collect_members(owner, derivation, content)?;
                        } else if !derivation.is(XSD_NAMESPACE, "annotation") {
                            self.unrecognized(child, derivation);
                        }
                    }
                }

                "attribute" => {
                    let field = self.parse_attribute(child)?;
                    content.fields.push(field);
                }

                "annotation" | "anyAttribute" | "attributeGroup" => (),

                facet if FACETS.contains(&facet) => (),

                _ => self.unrecognized(node, child),
            }
        }

        Ok(())
    }

    fn collect_particles(
        &mut self,
        owner: &str,
        node: Node<'_>,
        fields: &mut Vec<Field>,
    ) -> Result<(), Error> {
        for child in node.children() {
            if child.namespace() != Some(XSD_NAMESPACE) {
                self.unrecognized(node, child);
                continue;
            }

            match child.local_name() {
                "element" => {
                    let field = self.parse_field(owner, child)?;
                    fields.push(field);
                }
                "sequence" | "all" | "choice" => self.collect_particles(owner, child, fields)?,
                "annotation" | "any" | "group" => (),
                _ => self.unrecognized(node, child),
            }
        }

        Ok(())
    }

    fn parse_field(&mut self, owner: &str, node: Node<'_>) -> Result<Field, Error> {
        let [name, reference, ty, min, max, nillable] = get_attributes(
            node,
            ["name", "ref", "type", "minOccurs", "maxOccurs", "nillable"],
        );

        let name = name
            .or_else(|| reference.map(local_part))
            .unwrap_or_default()
            .to_owned();
        let label = format!("{}.{}", owner, name);

        let kind = if let Some(reference) = reference {
            FieldKind::Element(self.reference(node, reference)?)
        } else if let Some(ty) = ty {
            FieldKind::Type(self.reference(node, ty)?)
        } else if let Some(inline) = node.child(XSD_NAMESPACE, "complexType") {
            FieldKind::Inline(self.parse_members(&label, inline)?)
        } else if let Some(base) = self.simple_base(node)? {
            FieldKind::Type(base)
        } else {
            FieldKind::Untyped
        };

        Ok(Field {
            occurs: self.parse_occurs(&label, min, max),
            name,
            kind,
            nillable: nillable == Some("true"),
            attribute: false,
            documentation: xsd_documentation(node),
        })
    }

    fn parse_attribute(&mut self, node: Node<'_>) -> Result<Field, Error> {
        let [name, reference, ty, usage] = get_attributes(node, ["name", "ref", "type", "use"]);

        let kind = if let Some(ty) = ty {
            FieldKind::Type(self.reference(node, ty)?)
        } else if let Some(base) = self.simple_base(node)? {
            FieldKind::Type(base)
        } else {
            FieldKind::Untyped
        };

        let min = if usage == Some("required") { 1 } else { 0 };

        Ok(Field {
            name: name
                .or_else(|| reference.map(local_part))
                .unwrap_or_default()
                .to_owned(),
            kind,
            occurs: Occurs {
                min,
                max: MaxOccurs::Bounded(1),
            },
            nillable: false,
            attribute: true,
            documentation: xsd_documentation(node),
        })
    }

    fn parse_occurs(&mut self, field: &str, min: Option<&str>, max: Option<&str>) -> Occurs {
        let mut occurs = Occurs::default();

        if let Some(min) = min {
            match min.trim().parse() {
                Ok(min) => occurs.min = min,
                Err(_) => self.note(Diagnostic::InvalidOccurs {
                    field: field.to_owned(),
                    value: min.to_owned(),
                }),
            }
        }

        if let Some(max) = max {
            match max.trim() {
                "unbounded" => occurs.max = MaxOccurs::Unbounded,
                bounded => match bounded.parse() {
                    Ok(max) => occurs.max = MaxOccurs::Bounded(max),
                    Err(_) => self.note(Diagnostic::InvalidOccurs {
                        field: field.to_owned(),
                        value: max.to_owned(),
                    }),
                },
            }
        }

        occurs
    }
}

/// Walks a parsed document once and records every entity with its
/// references still pending.
pub fn build(document: &Document) -> Result<Definitions, Error> {
    Parser::new().parse(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Link, MessageId};
    use pretty_assertions::assert_eq;

    fn build_str(source: &str) -> Definitions {
        build(&Document::parse(source).unwrap()).unwrap()
    }

    const HEADER: &str = r#"<definitions name="Users" targetNamespace="urn:users"
        xmlns="http://schemas.xmlsoap.org/wsdl/"
        xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
        xmlns:tns="urn:users"
        xmlns:xsd="http://www.w3.org/2001/XMLSchema">"#;

    fn wsdl(body: &str) -> String {
        format!("{}{}</definitions>", HEADER, body)
    }

    #[test]
    fn collects_root_namespaces() {
        let definitions = build_str(&wsdl(""));

        assert_eq!(definitions.name.as_deref(), Some("Users"));
        assert_eq!(definitions.target_namespace.as_deref(), Some("urn:users"));
        assert_eq!(
            definitions.namespaces[2],
            (Some("tns".to_owned()), "urn:users".to_owned())
        );
    }

    #[test]
    fn parts_keep_source_order_and_missing_references() {
        let definitions = build_str(&wsdl(
            r#"<message name="Request">
                <part name="userId" type="xsd:string"/>
                <part name="body" element="tns:User"/>
                <part name="broken"/>
            </message>"#,
        ));

        let message = &definitions.messages[0];
        let names: Vec<_> = message.parts.iter().map(|part| part.name.as_str()).collect();

        assert_eq!(message.name, QName::new(Some("urn:users"), "Request"));
        assert_eq!(names, ["userId", "body", "broken"]);
        assert!(matches!(&message.parts[0].kind, PartKind::Type(r) if r.written == "xsd:string"));
        assert!(matches!(message.parts[2].kind, PartKind::Missing));
        assert!(definitions.diagnostics.contains(&Diagnostic::MissingPartReference {
            message: "Request".into(),
            part: "broken".into(),
        }));
    }

    #[test]
    fn operations_record_pending_message_references() {
        let definitions = build_str(&wsdl(
            r#"<portType name="UserPort">
                <operation name="GetUser">
                    <documentation>  Looks up
                        a user. </documentation>
                    <input message="tns:GetUserRequest"/>
                    <output message="tns:GetUserResponse"/>
                    <fault name="NotFound" message="tns:NotFound"/>
                </operation>
            </portType>"#,
        ));

        let operation = &definitions.port_types[0].operations[0];
        let input = operation.input.as_ref().unwrap();

        assert_eq!(operation.documentation.as_deref(), Some("Looks up a user."));
        assert_eq!(input.name, QName::new(Some("urn:users"), "GetUserRequest"));
        assert_eq!(input.link, Link::<MessageId>::Pending);
        assert_eq!(operation.faults[0].name.as_deref(), Some("NotFound"));
    }

    #[test]
    fn bindings_and_services_capture_soap_extensions() {
        let definitions = build_str(&wsdl(
            r#"<binding name="UserBinding" type="tns:UserPort">
                <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
                <operation name="GetUser">
                    <soap:operation soapAction="urn:GetUser"/>
                    <input><soap:body use="literal"/></input>
                </operation>
                <operation name="Ping"/>
            </binding>
            <service name="UserService">
                <port name="UserSoap" binding="tns:UserBinding">
                    <soap:address location="http://example.com/users"/>
                </port>
                <port name="Nowhere" binding="tns:UserBinding"/>
                <port name="Loose"/>
            </service>
            <binding name="Bare"><soap:binding style="rpc"/></binding>"#,
        ));

        let binding = &definitions.bindings[0];
        assert_eq!(binding.style.as_deref(), Some("document"));
        assert_eq!(binding.operations[0].action.as_deref(), Some("urn:GetUser"));
        assert_eq!(binding.operations[1].action, None);

        let ports = &definitions.services[0].ports;
        assert_eq!(ports[0].address.as_deref(), Some("http://example.com/users"));
        assert_eq!(ports[1].address, None);
        assert!(ports[2].binding.is_none());

        let bare = &definitions.bindings[1];
        assert_eq!(bare.name, QName::new(Some("urn:users"), "Bare"));
        assert!(bare.port_type.is_none());
        assert_eq!(bare.style.as_deref(), Some("rpc"));
        assert_eq!(definitions.unrecognized, 0);
        assert!(definitions.diagnostics.contains(&Diagnostic::MissingReference {
            referrer: "binding Bare".into(),
            attribute: "type",
        }));
        assert!(definitions.diagnostics.contains(&Diagnostic::MissingReference {
            referrer: "port Loose of service UserService".into(),
            attribute: "binding",
        }));
    }

    #[test]
    fn schema_types_fields_and_occurs() {
        let definitions = build_str(&wsdl(
            r#"<types>
                <xsd:schema targetNamespace="urn:users">
                    <xsd:complexType name="UserInfo">
                        <xsd:annotation><xsd:documentation>A user.</xsd:documentation></xsd:annotation>
                        <xsd:sequence>
                            <xsd:element name="name" type="xsd:string" minOccurs="1" maxOccurs="1"/>
                            <xsd:choice>
                                <xsd:element name="roles" type="xsd:string" minOccurs="0" maxOccurs="unbounded"/>
                            </xsd:choice>
                            <xsd:element ref="tns:Address"/>
                        </xsd:sequence>
                        <xsd:attribute name="id" type="xsd:int" use="required"/>
                    </xsd:complexType>
                    <xsd:element name="GetUser">
                        <xsd:complexType>
                            <xsd:sequence>
                                <xsd:element name="userId" type="xsd:string" nillable="true"/>
                            </xsd:sequence>
                        </xsd:complexType>
                    </xsd:element>
                    <xsd:simpleType name="Status">
                        <xsd:restriction base="xsd:string">
                            <xsd:enumeration value="ACTIVE"/>
                            <xsd:enumeration value="LOCKED"/>
                        </xsd:restriction>
                    </xsd:simpleType>
                </xsd:schema>
            </types>"#,
        ));

        let user = &definitions.complex_types[0];
        let fields = &user.content.fields;
        assert_eq!(user.documentation.as_deref(), Some("A user."));
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].occurs, Occurs::default());
        assert_eq!(fields[1].occurs.max, MaxOccurs::Unbounded);
        assert_eq!(fields[1].occurs.min, 0);
        assert_eq!(fields[2].name, "Address");
        assert!(matches!(fields[2].kind, FieldKind::Element(_)));
        assert!(fields[3].attribute);

        match &definitions.elements[0].kind {
            ElementKind::Inline(content) => assert!(content.fields[0].nillable),
            other => panic!("unexpected element kind {:?}", other),
        }

        assert_eq!(definitions.simple_types[0].enumeration, ["ACTIVE", "LOCKED"]);
        assert_eq!(
            definitions.declarations,
            [
                Declaration::Complex(ComplexTypeId(0)),
                Declaration::Element(ElementId(0)),
                Declaration::Simple(SimpleTypeId(0)),
            ]
        );
    }

    #[test]
    fn unknown_constructs_are_counted_not_fatal() {
        let definitions = build_str(&wsdl(
            r#"<wsp:Policy xmlns:wsp="urn:policy"/>
            <message name="Ping"><part name="x" type="xsd:int"/><extra/></message>"#,
        ));

        assert_eq!(definitions.unrecognized, 2);
        assert_eq!(definitions.messages.len(), 1);
        assert_eq!(
            definitions
                .diagnostics
                .iter()
                .filter(|diagnostic| matches!(diagnostic, Diagnostic::UnrecognizedElement { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn invalid_occurs_fall_back_to_one() {
        let definitions = build_str(&wsdl(
            r#"<types><xsd:schema targetNamespace="urn:users">
                <xsd:complexType name="T"><xsd:sequence>
                    <xsd:element name="f" type="xsd:int" minOccurs="many"/>
                </xsd:sequence></xsd:complexType>
            </xsd:schema></types>"#,
        ));

        assert_eq!(definitions.complex_types[0].content.fields[0].occurs.min, 1);
        assert!(definitions.diagnostics.contains(&Diagnostic::InvalidOccurs {
            field: "T.f".into(),
            value: "many".into(),
        }));
    }

    #[test]
    fn rejects_foreign_root() {
        let document = Document::parse("<schema/>").unwrap();
        assert!(matches!(build(&document), Err(Error::UnexpectedRoot(_))));
    }

    #[test]
    fn unbound_reference_prefix_is_fatal() {
        let document = Document::parse(&wsdl(
            r#"<binding name="B" type="missing:Port"/>"#,
        ))
        .unwrap();

        assert!(matches!(build(&document), Err(Error::UnboundPrefix { .. })));
    }
}
