//! Second pass over a built model: turns every pending qualified-name
//! reference into a typed link, or marks it unresolved and records why.
//!
//! Forward references are legal in WSDL, so this only runs once the whole
//! document has been walked.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{
    error::Error,
    types::{
        primitive, BindingId, ComplexTypeId, Content, Definitions, Diagnostic, ElementId,
        ElementKind, EntityKind, FieldKind, Link, MessageId, PartKind, PortTypeId, QName,
        Reference, ServiceId, SimpleTypeId, TypeTarget,
    },
};

#[derive(Default)]
struct Index {
    bindings: HashMap<QName, BindingId>,
    port_types: HashMap<QName, PortTypeId>,
    messages: HashMap<QName, MessageId>,
    complex_types: HashMap<QName, ComplexTypeId>,
    simple_types: HashMap<QName, SimpleTypeId>,
    elements: HashMap<QName, ElementId>,
}

fn unique<'a, Id>(
    kind: EntityKind,
    names: impl Iterator<Item = &'a QName>,
    id: fn(usize) -> Id,
) -> Result<HashMap<QName, Id>, Error> {
    let mut table = HashMap::new();

    for (index, name) in names.enumerate() {
        if table.insert(name.clone(), id(index)).is_some() {
            return Err(Error::DuplicateEntity {
                kind,
                name: name.clone(),
            });
        }
    }

    Ok(table)
}

impl Index {
    fn new(definitions: &Definitions) -> Result<Self, Error> {
        // Services are never referenced, but their names still have to be
        // unique for anchors to be.
        unique(
            EntityKind::Service,
            definitions.services.iter().map(|service| &service.name),
            ServiceId,
        )?;

        Ok(Self {
            bindings: unique(
                EntityKind::Binding,
                definitions.bindings.iter().map(|binding| &binding.name),
                BindingId,
            )?,
            port_types: unique(
                EntityKind::PortType,
                definitions.port_types.iter().map(|port_type| &port_type.name),
                PortTypeId,
            )?,
            messages: unique(
                EntityKind::Message,
                definitions.messages.iter().map(|message| &message.name),
                MessageId,
            )?,
            complex_types: unique(
                EntityKind::ComplexType,
                definitions.complex_types.iter().map(|ty| &ty.name),
                ComplexTypeId,
            )?,
            simple_types: unique(
                EntityKind::SimpleType,
                definitions.simple_types.iter().map(|ty| &ty.name),
                SimpleTypeId,
            )?,
            elements: unique(
                EntityKind::Element,
                definitions.elements.iter().map(|element| &element.name),
                ElementId,
            )?,
        })
    }

    fn binding(&self, name: &QName) -> Option<BindingId> {
        self.bindings.get(name).copied()
    }

    fn port_type(&self, name: &QName) -> Option<PortTypeId> {
        self.port_types.get(name).copied()
    }

    fn message(&self, name: &QName) -> Option<MessageId> {
        self.messages.get(name).copied()
    }

    fn element(&self, name: &QName) -> Option<ElementId> {
        self.elements.get(name).copied()
    }

    /// Built-ins first, then local complex types, simple types and finally
    /// top-level elements.
    fn type_target(&self, name: &QName) -> Option<TypeTarget> {
        primitive(name)
            .map(TypeTarget::Primitive)
            .or_else(|| self.complex_types.get(name).copied().map(TypeTarget::Complex))
            .or_else(|| self.simple_types.get(name).copied().map(TypeTarget::Simple))
            .or_else(|| self.elements.get(name).copied().map(TypeTarget::Element))
    }
}

struct Resolver<'a> {
    index: &'a Index,
    diagnostics: Vec<Diagnostic>,
    resolved: usize,
}

impl<'a> Resolver<'a> {
    fn link<T>(
        &mut self,
        reference: &mut Reference<T>,
        kind: EntityKind,
        referrer: &str,
        lookup: impl Fn(&Index, &QName) -> Option<T>,
    ) {
        match lookup(self.index, &reference.name) {
            Some(target) => {
                reference.link = Link::Resolved(target);
                self.resolved += 1;
            }

            None => {
                warn!(%referrer, target = %reference.name, %kind, "unresolved reference");
                reference.link = Link::Unresolved;
                self.diagnostics.push(Diagnostic::UnresolvedReference {
                    kind,
                    target: reference.name.clone(),
                    referrer: referrer.to_owned(),
                });
            }
        }
    }

    fn link_type(&mut self, reference: &mut Reference<TypeTarget>, referrer: &str) {
        self.link(reference, EntityKind::Type, referrer, Index::type_target);
    }

    fn content(&mut self, content: &mut Content, owner: &str) {
        if let Some(base) = &mut content.base {
            self.link_type(base, &format!("base of {}", owner));
        }

        for field in &mut content.fields {
            let referrer = format!("field {}.{}", owner, field.name);

            match &mut field.kind {
                FieldKind::Type(ty) => self.link_type(ty, &referrer),
                FieldKind::Element(element) => {
                    self.link(element, EntityKind::Element, &referrer, Index::element)
                }
                FieldKind::Inline(inline) => {
                    self.content(inline, &format!("{}.{}", owner, field.name))
                }
                FieldKind::Untyped => (),
            }
        }
    }

    fn definitions(&mut self, definitions: &mut Definitions) {
        for service in &mut definitions.services {
            for port in &mut service.ports {
                if let Some(binding) = &mut port.binding {
                    let referrer = format!("port {} of service {}", port.name, service.name.name);
                    self.link(binding, EntityKind::Binding, &referrer, Index::binding);
                }
            }
        }

        for binding in &mut definitions.bindings {
            if let Some(port_type) = &mut binding.port_type {
                let referrer = format!("binding {}", binding.name.name);
                self.link(port_type, EntityKind::PortType, &referrer, Index::port_type);
            }
        }

        for port_type in &mut definitions.port_types {
            for operation in &mut port_type.operations {
                let referrer = format!("operation {}.{}", port_type.name.name, operation.name);

                if let Some(input) = &mut operation.input {
                    self.link(
                        input,
                        EntityKind::Message,
                        &format!("{} input", referrer),
                        Index::message,
                    );
                }

                if let Some(output) = &mut operation.output {
                    self.link(
                        output,
                        EntityKind::Message,
                        &format!("{} output", referrer),
                        Index::message,
                    );
                }

                for fault in &mut operation.faults {
                    self.link(
                        &mut fault.message,
                        EntityKind::Message,
                        &format!("{} fault", referrer),
                        Index::message,
                    );
                }
            }
        }

        for message in &mut definitions.messages {
            for part in &mut message.parts {
                let referrer = format!("part {} of message {}", part.name, message.name.name);

                match &mut part.kind {
                    PartKind::Element(element) => {
                        self.link(element, EntityKind::Element, &referrer, Index::element)
                    }
                    PartKind::Type(ty) => self.link_type(ty, &referrer),
                    PartKind::Missing => (),
                }
            }
        }

        for complex_type in &mut definitions.complex_types {
            let owner = complex_type.name.name.clone();
            self.content(&mut complex_type.content, &owner);
        }

        for simple_type in &mut definitions.simple_types {
            if let Some(base) = &mut simple_type.base {
                let referrer = format!("base of {}", simple_type.name.name);
                self.link_type(base, &referrer);
            }
        }

        for element in &mut definitions.elements {
            let owner = element.name.name.clone();

            match &mut element.kind {
                ElementKind::Type(ty) => self.link_type(ty, &format!("element {}", owner)),
                ElementKind::Inline(content) => self.content(content, &owner),
                ElementKind::Untyped => (),
            }
        }
    }
}

/// Resolves every reference in `definitions` in place. Only a uniqueness
/// violation is fatal; missing targets become [`Link::Unresolved`] plus a
/// diagnostic.
pub fn resolve(definitions: &mut Definitions) -> Result<(), Error> {
    let index = Index::new(definitions)?;

    let mut resolver = Resolver {
        index: &index,
        diagnostics: Vec::new(),
        resolved: 0,
    };

    resolver.definitions(definitions);

    debug!(
        resolved = resolver.resolved,
        unresolved = resolver.diagnostics.len(),
        "resolved references"
    );

    definitions.diagnostics.extend(resolver.diagnostics);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Binding, Message, Operation, Part, PortType, Service, XSD_NAMESPACE};
    use pretty_assertions::assert_eq;

    fn tns(name: &str) -> QName {
        QName::new(Some("urn:t"), name)
    }

    fn reference<T>(name: QName) -> Reference<T> {
        let written = format!("tns:{}", name.name);
        Reference::new(name, &written)
    }

    fn message(name: &str, parts: Vec<Part>) -> Message {
        Message {
            name: tns(name),
            parts,
        }
    }

    #[test]
    fn forward_references_resolve() {
        let mut definitions = Definitions {
            bindings: vec![Binding {
                name: tns("B"),
                port_type: Some(reference(tns("P"))),
                style: None,
                transport: None,
                operations: Vec::new(),
            }],
            port_types: vec![PortType {
                name: tns("P"),
                operations: Vec::new(),
            }],
            ..Default::default()
        };

        resolve(&mut definitions).unwrap();

        assert_eq!(
            definitions.bindings[0].port_type.as_ref().unwrap().link,
            Link::Resolved(PortTypeId(0))
        );
        assert!(definitions.diagnostics.is_empty());
    }

    #[test]
    fn misses_are_marked_and_do_not_stop_the_pass() {
        let operation = |name: &str, input: &str| Operation {
            name: name.into(),
            documentation: None,
            input: Some(reference(tns(input))),
            output: None,
            faults: Vec::new(),
        };

        let mut definitions = Definitions {
            port_types: vec![PortType {
                name: tns("P"),
                operations: vec![operation("Broken", "Nope"), operation("Fine", "Ping")],
            }],
            messages: vec![message("Ping", Vec::new())],
            ..Default::default()
        };

        resolve(&mut definitions).unwrap();

        let operations = &definitions.port_types[0].operations;
        assert!(operations[0].input.as_ref().unwrap().is_unresolved());
        assert_eq!(
            operations[1].input.as_ref().unwrap().link,
            Link::Resolved(MessageId(0))
        );
        assert_eq!(
            definitions.diagnostics,
            [Diagnostic::UnresolvedReference {
                kind: EntityKind::Message,
                target: tns("Nope"),
                referrer: "operation P.Broken input".into(),
            }]
        );
    }

    #[test]
    fn primitives_resolve_to_the_synthetic_target() {
        let mut definitions = Definitions {
            messages: vec![message(
                "M",
                vec![Part {
                    name: "id".into(),
                    kind: PartKind::Type(Reference::new(
                        QName::new(Some(XSD_NAMESPACE), "string"),
                        "xsd:string",
                    )),
                }],
            )],
            ..Default::default()
        };

        resolve(&mut definitions).unwrap();

        match &definitions.messages[0].parts[0].kind {
            PartKind::Type(ty) => assert_eq!(ty.link, Link::Resolved(TypeTarget::Primitive("string"))),
            other => panic!("unexpected part kind {:?}", other),
        }
    }

    #[test]
    fn duplicate_names_are_malformed() {
        let mut definitions = Definitions {
            messages: vec![message("Same", Vec::new()), message("Same", Vec::new())],
            ..Default::default()
        };

        assert!(matches!(
            resolve(&mut definitions),
            Err(Error::DuplicateEntity {
                kind: EntityKind::Message,
                ..
            })
        ));
    }

    #[test]
    fn overloaded_operations_are_kept() {
        let operation = Operation {
            name: "Twice".into(),
            documentation: None,
            input: None,
            output: None,
            faults: Vec::new(),
        };

        let mut definitions = Definitions {
            port_types: vec![PortType {
                name: tns("P"),
                operations: vec![operation.clone(), operation],
            }],
            ..Default::default()
        };

        resolve(&mut definitions).unwrap();
        assert_eq!(definitions.port_types[0].operations.len(), 2);
    }

    #[test]
    fn duplicate_services_are_malformed() {
        let service = Service {
            name: tns("S"),
            documentation: None,
            ports: Vec::new(),
        };

        let mut definitions = Definitions {
            services: vec![service.clone(), service],
            ..Default::default()
        };

        assert!(matches!(
            resolve(&mut definitions),
            Err(Error::DuplicateEntity {
                kind: EntityKind::Service,
                ..
            })
        ));
    }
}
