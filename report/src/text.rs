//! Plain-text report: fixed section order, box-drawing rules and trees.

use suds_wsdl::types::{
    Binding, ComplexType, Content, Declaration, Definitions, Diagnostic, Element, ElementKind,
    Field, FieldKind, Message, PartKind, PortType, Reference, Service, SimpleType,
};

use crate::index;

const RULE_WIDTH: usize = 80;
const ABSENT: &str = "—";

pub trait Describe {
    fn describe(&self, definitions: &Definitions) -> Vec<String>;
}

fn describe_all(all: &[impl Describe], definitions: &Definitions) -> Vec<String> {
    all.iter()
        .flat_map(|item| item.describe(definitions))
        .collect()
}

fn rule() -> String {
    "═".repeat(RULE_WIDTH)
}

fn branch(last: bool) -> &'static str {
    if last {
        "└─ "
    } else {
        "├─ "
    }
}

fn stem(last: bool) -> &'static str {
    if last {
        "   "
    } else {
        "│  "
    }
}

fn reference<T>(reference: &Reference<T>) -> String {
    match reference.target() {
        Some(_) => reference.written.clone(),
        None => format!("{} [unresolved]", reference.written),
    }
}

fn optional_reference<T>(reference_or_absent: Option<&Reference<T>>) -> String {
    reference_or_absent.map_or_else(|| ABSENT.to_owned(), reference)
}

fn required_reference<T>(reference_or_missing: Option<&Reference<T>>, what: &str) -> String {
    reference_or_missing.map_or_else(|| format!("[no {} reference]", what), reference)
}

fn heading(kind: &str, name: &str) -> Vec<String> {
    vec![String::new(), format!("[{}] {}", kind, name)]
}

fn description(lines: &mut Vec<String>, documentation: Option<&str>) {
    if let Some(documentation) = documentation {
        lines.push(format!("    Description: {}", documentation));
    }
}

fn field_line(field: &Field) -> String {
    let name = if field.attribute {
        format!("@{}", field.name)
    } else {
        field.name.clone()
    };

    let ty = match &field.kind {
        FieldKind::Type(ty) => reference(ty),
        FieldKind::Element(element) => format!("{} (ref)", reference(element)),
        FieldKind::Inline(_) => "(inline)".to_owned(),
        FieldKind::Untyped => "anyType".to_owned(),
    };

    let mut line = format!("{}: {} [{}]", name, ty, field.occurs);

    if field.nillable {
        line.push_str(" (nillable)");
    }

    if let Some(documentation) = &field.documentation {
        line.push_str(" - ");
        line.push_str(documentation);
    }

    line
}

fn fields(content: &Content, prefix: &str, lines: &mut Vec<String>) {
    for (position, field) in content.fields.iter().enumerate() {
        let last = position + 1 == content.fields.len();
        lines.push(format!("{}{}{}", prefix, branch(last), field_line(field)));

        if let FieldKind::Inline(inline) = &field.kind {
            let nested = format!("{}{}", prefix, stem(last));

            if let Some(base) = &inline.base {
                lines.push(format!("{}   Extends: {}", nested, reference(base)));
            }

            fields(inline, &nested, lines);
        }
    }
}

fn content(content: &Content, lines: &mut Vec<String>) {
    if let Some(base) = &content.base {
        lines.push(format!("    Extends: {}", reference(base)));
    }

    if content.fields.is_empty() {
        lines.push("  (no fields)".to_owned());
    } else {
        fields(content, "  ", lines);
    }
}

impl Describe for Service {
    fn describe(&self, _: &Definitions) -> Vec<String> {
        let mut lines = heading("Service", &self.name.name);
        description(&mut lines, self.documentation.as_deref());

        for (position, port) in self.ports.iter().enumerate() {
            let last = position + 1 == self.ports.len();

            lines.push(format!("  {}Port: {}", branch(last), port.name));
            lines.push(format!(
                "  {}├─ Binding: {}",
                stem(last),
                required_reference(port.binding.as_ref(), "binding")
            ));
            lines.push(format!(
                "  {}└─ Endpoint: {}",
                stem(last),
                port.address.as_deref().unwrap_or("unknown")
            ));
        }

        lines
    }
}

impl Describe for Binding {
    fn describe(&self, _: &Definitions) -> Vec<String> {
        let mut lines = heading("Binding", &self.name.name);
        lines.push(format!(
            "    Port type: {}",
            required_reference(self.port_type.as_ref(), "type")
        ));

        if let Some(style) = &self.style {
            lines.push(format!("    Style: {}", style));
        }

        if let Some(transport) = &self.transport {
            lines.push(format!("    Transport: {}", transport));
        }

        for (position, operation) in self.operations.iter().enumerate() {
            let last = position + 1 == self.operations.len();
            let action = operation
                .action
                .as_deref()
                .filter(|action| !action.is_empty())
                .unwrap_or(ABSENT);

            let mut line = format!("  {}Operation: {} → {}", branch(last), operation.name, action);
            if let Some(style) = &operation.style {
                line.push_str(&format!(" ({})", style));
            }

            lines.push(line);
        }

        lines
    }
}

impl Describe for PortType {
    fn describe(&self, definitions: &Definitions) -> Vec<String> {
        let mut lines = heading("PortType", &self.name.name);

        for (position, operation) in self.operations.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("  ● {}", operation.name));
            description(&mut lines, operation.documentation.as_deref());
            lines.push(format!(
                "    Input: {}",
                optional_reference(operation.input.as_ref())
            ));
            lines.push(format!(
                "    Output: {}",
                optional_reference(operation.output.as_ref())
            ));

            for fault in &operation.faults {
                lines.push(match &fault.name {
                    Some(name) => format!("    Fault: {} ({})", name, reference(&fault.message)),
                    None => format!("    Fault: {}", reference(&fault.message)),
                });
            }

            lines.push(format!(
                "    SOAPAction: {}",
                index::soap_action(definitions, &self.name, position).unwrap_or(ABSENT)
            ));
        }

        lines
    }
}

impl Describe for Message {
    fn describe(&self, _: &Definitions) -> Vec<String> {
        let mut lines = heading("Message", &self.name.name);

        if self.parts.is_empty() {
            lines.push("  (no parts)".to_owned());
        }

        for (position, part) in self.parts.iter().enumerate() {
            let last = position + 1 == self.parts.len();
            let target = match &part.kind {
                PartKind::Element(element) => format!("{} (element)", reference(element)),
                PartKind::Type(ty) => reference(ty),
                PartKind::Missing => "[no type reference]".to_owned(),
            };

            lines.push(format!("  {}{}: {}", branch(last), part.name, target));
        }

        lines
    }
}

impl Describe for ComplexType {
    fn describe(&self, _: &Definitions) -> Vec<String> {
        let mut lines = heading("ComplexType", &self.name.name);
        description(&mut lines, self.documentation.as_deref());
        content(&self.content, &mut lines);
        lines
    }
}

impl Describe for SimpleType {
    fn describe(&self, _: &Definitions) -> Vec<String> {
        let mut lines = match &self.base {
            Some(base) => heading(
                "SimpleType",
                &format!("{} : {}", self.name.name, reference(base)),
            ),
            None => heading("SimpleType", &self.name.name),
        };

        description(&mut lines, self.documentation.as_deref());

        if !self.enumeration.is_empty() {
            lines.push(format!("    Values: {}", self.enumeration.join(", ")));
        }

        lines
    }
}

impl Describe for Element {
    fn describe(&self, _: &Definitions) -> Vec<String> {
        match &self.kind {
            ElementKind::Inline(inline) => {
                let mut lines = heading("Element", &self.name.name);
                description(&mut lines, self.documentation.as_deref());
                content(inline, &mut lines);
                lines
            }
            ElementKind::Type(ty) => {
                let mut lines =
                    heading("Element", &format!("{} : {}", self.name.name, reference(ty)));
                description(&mut lines, self.documentation.as_deref());
                lines
            }
            ElementKind::Untyped => {
                let mut lines = heading("Element", &format!("{} : anyType", self.name.name));
                description(&mut lines, self.documentation.as_deref());
                lines
            }
        }
    }
}

impl Describe for Declaration {
    fn describe(&self, definitions: &Definitions) -> Vec<String> {
        match *self {
            Declaration::Complex(id) => definitions.complex_type(id).describe(definitions),
            Declaration::Simple(id) => definitions.simple_type(id).describe(definitions),
            Declaration::Element(id) => definitions.element(id).describe(definitions),
        }
    }
}

fn diagnostics(definitions: &Definitions) -> Vec<String> {
    let mut lines: Vec<String> = definitions
        .diagnostics
        .iter()
        .filter(|diagnostic| !matches!(diagnostic, Diagnostic::UnrecognizedElement { .. }))
        .map(|diagnostic| format!("  - {}", diagnostic))
        .collect();

    if definitions.unrecognized > 0 {
        lines.push(format!(
            "  {} unrecognized element(s) skipped",
            definitions.unrecognized
        ));
    }

    if !lines.is_empty() {
        lines.insert(0, String::new());
    }

    lines
}

fn section(lines: &mut Vec<String>, title: &str, body: Vec<String>) {
    lines.push(String::new());
    lines.push(rule());
    lines.push(title.to_owned());
    lines.push(rule());

    if body.is_empty() {
        lines.push(String::new());
        lines.push("  (none)".to_owned());
    } else {
        lines.extend(body);
    }
}

/// Renders the whole model as a plain-text report. The same model always
/// produces the same bytes.
pub fn text(definitions: &Definitions) -> String {
    let mut lines = vec![
        rule(),
        format!(
            "WSDL Report: {}",
            definitions.name.as_deref().unwrap_or("(unnamed)")
        ),
        rule(),
        format!(
            "Target namespace: {}",
            definitions.target_namespace.as_deref().unwrap_or("(none)")
        ),
    ];

    if !definitions.namespaces.is_empty() {
        lines.push("Namespaces:".to_owned());

        for (prefix, uri) in &definitions.namespaces {
            lines.push(format!(
                "  {} = {}",
                prefix.as_deref().unwrap_or("(default)"),
                uri
            ));
        }
    }

    section(
        &mut lines,
        "Services",
        describe_all(&definitions.services, definitions),
    );
    section(
        &mut lines,
        "Bindings",
        describe_all(&definitions.bindings, definitions),
    );
    section(
        &mut lines,
        "Operations",
        describe_all(&definitions.port_types, definitions),
    );
    section(
        &mut lines,
        "Messages",
        describe_all(&definitions.messages, definitions),
    );
    section(
        &mut lines,
        "Data Types",
        describe_all(&definitions.declarations, definitions),
    );

    let diagnostics = diagnostics(definitions);
    if !diagnostics.is_empty() {
        section(&mut lines, "Diagnostics", diagnostics);
    }

    lines.push(String::new());
    lines.push(rule());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
