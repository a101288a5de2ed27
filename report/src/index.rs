//! Lookups both reporters need that the model does not store directly.

use std::collections::HashMap;

use suds_wsdl::types::{
    Content, Definitions, ElementKind, FieldKind, PartKind, PortTypeId, QName, Reference,
};

use crate::anchor::Anchors;

/// The first non-empty SOAPAction declared for the operation at `position`
/// by any binding of the port type named `port_type`.
pub fn soap_action<'a>(
    definitions: &'a Definitions,
    port_type: &QName,
    position: usize,
) -> Option<&'a str> {
    let id = definitions
        .port_types
        .iter()
        .position(|candidate| candidate.name == *port_type)?;

    definitions.soap_action(PortTypeId(id), position)
}

/// One entity pointing at another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub anchor: String,
    pub label: String,
}

/// Resolved references inverted: target anchor to the entities that point at
/// it, in model order.
#[derive(Debug, Default)]
pub struct Index {
    usages: HashMap<String, Vec<Usage>>,
}

impl Index {
    pub fn build(definitions: &Definitions, anchors: Anchors<'_>) -> Self {
        let mut index = Self::default();

        for service in &definitions.services {
            let referrer = anchors.service(&service.name);

            for port in &service.ports {
                if let Some(id) = port.binding.as_ref().and_then(Reference::target) {
                    index.record(
                        anchors.binding(&definitions.binding(*id).name),
                        &referrer,
                        format!("{} port {}", service.name.name, port.name),
                    );
                }
            }
        }

        for binding in &definitions.bindings {
            if let Some(id) = binding.port_type.as_ref().and_then(Reference::target) {
                index.record(
                    anchors.port_type(&definitions.port_type(*id).name),
                    &anchors.binding(&binding.name),
                    binding.name.name.clone(),
                );
            }
        }

        for port_type in &definitions.port_types {
            for (position, operation) in port_type.operations.iter().enumerate() {
                let referrer = anchors.operation(port_type, position);
                let messages = operation
                    .input
                    .iter()
                    .map(|input| (input, "input"))
                    .chain(operation.output.iter().map(|output| (output, "output")))
                    .chain(operation.faults.iter().map(|fault| (&fault.message, "fault")));

                for (message, role) in messages {
                    if let Some(id) = message.target() {
                        index.record(
                            anchors.message(&definitions.message(*id).name),
                            &referrer,
                            format!("{}.{} ({})", port_type.name.name, operation.name, role),
                        );
                    }
                }
            }
        }

        for message in &definitions.messages {
            let referrer = anchors.message(&message.name);

            for part in &message.parts {
                let target = match &part.kind {
                    PartKind::Element(element) => element
                        .target()
                        .map(|id| anchors.element(&definitions.element(*id).name)),
                    PartKind::Type(ty) => ty
                        .target()
                        .and_then(|target| anchors.type_target(definitions, *target)),
                    PartKind::Missing => None,
                };

                if let Some(target) = target {
                    index.record(
                        target,
                        &referrer,
                        format!("{}.{}", message.name.name, part.name),
                    );
                }
            }
        }

        for ty in &definitions.complex_types {
            let referrer = anchors.complex_type(&ty.name);
            index.content(definitions, anchors, &ty.content, &referrer, &ty.name.name);
        }

        for ty in &definitions.simple_types {
            let base = ty
                .base
                .as_ref()
                .and_then(|base| base.target())
                .and_then(|target| anchors.type_target(definitions, *target));

            if let Some(base) = base {
                index.record(
                    base,
                    &anchors.simple_type(&ty.name),
                    format!("{} (base)", ty.name.name),
                );
            }
        }

        for element in &definitions.elements {
            let referrer = anchors.element(&element.name);

            match &element.kind {
                ElementKind::Inline(content) => {
                    index.content(definitions, anchors, content, &referrer, &element.name.name)
                }
                ElementKind::Type(ty) => {
                    if let Some(target) = ty
                        .target()
                        .and_then(|target| anchors.type_target(definitions, *target))
                    {
                        index.record(target, &referrer, element.name.name.clone());
                    }
                }
                ElementKind::Untyped => (),
            }
        }

        index
    }

    fn content(
        &mut self,
        definitions: &Definitions,
        anchors: Anchors<'_>,
        content: &Content,
        referrer: &str,
        owner: &str,
    ) {
        if let Some(base) = content
            .base
            .as_ref()
            .and_then(|base| base.target())
            .and_then(|target| anchors.type_target(definitions, *target))
        {
            self.record(base, referrer, format!("{} (base)", owner));
        }

        for field in &content.fields {
            let label = format!("{}.{}", owner, field.name);

            match &field.kind {
                FieldKind::Type(ty) => {
                    if let Some(target) = ty
                        .target()
                        .and_then(|target| anchors.type_target(definitions, *target))
                    {
                        self.record(target, referrer, label);
                    }
                }
                FieldKind::Element(element) => {
                    if let Some(id) = element.target() {
                        self.record(
                            anchors.element(&definitions.element(*id).name),
                            referrer,
                            label,
                        );
                    }
                }
                FieldKind::Inline(inline) => {
                    self.content(definitions, anchors, inline, referrer, &label)
                }
                FieldKind::Untyped => (),
            }
        }
    }

    fn record(&mut self, target: String, referrer: &str, label: String) {
        self.usages.entry(target).or_default().push(Usage {
            anchor: referrer.to_owned(),
            label,
        });
    }

    pub fn usages(&self, anchor: &str) -> &[Usage] {
        self.usages.get(anchor).map_or(&[][..], Vec::as_slice)
    }
}
