//! Self-contained HTML report with a table of contents, stable anchors and
//! links in both directions.

use std::borrow::Cow;

use quick_xml::escape::escape as escape_bytes;
use suds_wsdl::types::{
    Binding, ComplexType, Content, Declaration, Definitions, Diagnostic, Element, ElementId,
    ElementKind, FieldKind, Message, MessageId, PartKind, PortType, Reference, Service,
    SimpleType, TypeTarget,
};

use crate::{
    anchor::{self, Anchors},
    index::{self, Index},
};

const ABSENT: &str = "—";

const STYLE: &str = r#"
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #eef0f7; margin: 0; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 10px; box-shadow: 0 10px 40px rgba(0,0,0,0.2); padding: 40px; }
h1 { color: #667eea; border-bottom: 3px solid #667eea; padding-bottom: 10px; }
h2 { color: #764ba2; margin-top: 30px; padding: 10px; background: #f0f0f0; border-left: 5px solid #667eea; }
h3 { color: #555; margin-top: 20px; }
.service, .binding, .porttype, .operation, .message, .type { background: #f9f9f9; border: 1px solid #ddd; border-radius: 5px; padding: 15px; margin: 10px 0; }
.operation { background: #e8f4f8; }
.label { font-weight: bold; color: #667eea; }
.value { color: #333; margin-left: 10px; }
.kind { font-size: 0.7em; color: #999; font-weight: normal; }
.endpoint { word-break: break-all; color: #0066cc; }
.empty, .missing { color: #999; font-style: italic; }
table { width: 100%; border-collapse: collapse; margin: 10px 0; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; vertical-align: top; }
th { background-color: #667eea; color: white; }
table table th { background-color: #9aa6f0; }
.badge { display: inline-block; padding: 3px 8px; border-radius: 3px; font-size: 0.85em; margin: 2px; color: white; }
.badge-input { background: #4caf50; }
.badge-output { background: #2196f3; }
.badge-fault { background: #ff9800; }
.badge-unresolved { background: #e53935; }
.unresolved { color: #e53935; }
.ref-link { color: #0066cc; text-decoration: none; border-bottom: 1px dashed #0066cc; }
.ref-link:hover { color: #004499; border-bottom-style: solid; background-color: #e8f4f8; }
.backlinks { font-size: 0.9em; color: #666; }
:target { animation: highlight 2s ease; }
@keyframes highlight { 0% { background-color: #ffeb3b; } 100% { background-color: transparent; } }
.toc { background: #f5f5f5; border: 1px solid #ddd; border-radius: 5px; padding: 15px; margin-bottom: 20px; }
.toc h3 { margin-top: 0; color: #667eea; }
.toc ul { list-style-type: none; padding-left: 0; }
.toc ul ul { padding-left: 20px; }
.toc li { margin: 5px 0; }
.toc a { color: #667eea; text-decoration: none; }
.toc a:hover { text-decoration: underline; }
"#;

fn escape(raw: &str) -> Cow<'_, str> {
    match escape_bytes(raw.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(raw),
        Cow::Owned(escaped) => Cow::Owned(String::from_utf8_lossy(&escaped).into_owned()),
    }
}

fn href(anchor: &str, text: &str) -> String {
    format!(r##"<a href="#{}" class="ref-link">{}</a>"##, anchor, escape(text))
}

fn documentation(documentation: Option<&str>) -> String {
    documentation.map_or_else(String::new, |documentation| {
        format!("<p><i>{}</i></p>", escape(documentation))
    })
}

fn labelled(label: &str, value: &str) -> String {
    format!(
        r#"<p><span class="label">{}:</span> <span class="value">{}</span></p>"#,
        label, value
    )
}

pub trait Markup {
    fn markup(&self, page: &Page<'_>) -> String;
}

fn markup_all(all: &[impl Markup], page: &Page<'_>) -> String {
    all.iter().map(|item| item.markup(page)).collect()
}

/// Everything a fragment needs to link to other fragments.
pub struct Page<'a> {
    definitions: &'a Definitions,
    anchors: Anchors<'a>,
    index: Index,
}

impl<'a> Page<'a> {
    fn new(definitions: &'a Definitions) -> Self {
        let anchors = Anchors::new(definitions);

        Self {
            definitions,
            anchors,
            index: Index::build(definitions, anchors),
        }
    }

    /// A link when the reference resolved to something with an anchor, plain
    /// text for built-in types, and a marked span otherwise.
    fn link<T>(
        &self,
        reference: &Reference<T>,
        anchor: impl FnOnce(&T) -> Option<String>,
    ) -> String {
        match reference.target() {
            Some(target) => match anchor(target) {
                Some(anchor) => href(&anchor, &reference.written),
                None => format!(
                    r#"<span class="primitive">{}</span>"#,
                    escape(&reference.written)
                ),
            },
            None => format!(
                r#"<span class="unresolved">{} <span class="badge badge-unresolved">unresolved</span></span>"#,
                escape(&reference.written)
            ),
        }
    }

    /// Like [`Page::link`] for a reference attribute that may be absent.
    fn required_link<T>(
        &self,
        reference: Option<&Reference<T>>,
        what: &str,
        anchor: impl FnOnce(&T) -> Option<String>,
    ) -> String {
        match reference {
            Some(reference) => self.link(reference, anchor),
            None => format!(r#"<span class="missing">no {} reference</span>"#, what),
        }
    }

    fn type_link(&self, reference: &Reference<TypeTarget>) -> String {
        self.link(reference, |target| {
            self.anchors.type_target(self.definitions, *target)
        })
    }

    fn element_link(&self, reference: &Reference<ElementId>) -> String {
        self.link(reference, |id| {
            Some(self.anchors.element(&self.definitions.element(*id).name))
        })
    }

    fn backlinks(&self, anchor: &str) -> String {
        let usages = self.index.usages(anchor);

        if usages.is_empty() {
            return String::new();
        }

        let links: Vec<_> = usages
            .iter()
            .map(|usage| href(&usage.anchor, &usage.label))
            .collect();

        format!(
            r#"<p class="backlinks"><span class="label">Referenced by:</span> {}</p>"#,
            links.join(", ")
        )
    }

    fn fields(&self, content: &Content) -> String {
        let mut html = String::new();

        if let Some(base) = &content.base {
            html.push_str(&labelled("Extends", &self.type_link(base)));
        }

        if content.fields.is_empty() {
            html.push_str(r#"<p class="empty">No fields</p>"#);
            return html;
        }

        html.push_str("<table><tr><th>Field</th><th>Type</th><th>Occurs</th><th>Nillable</th><th>Description</th></tr>");

        for field in &content.fields {
            let name = if field.attribute {
                format!("@{}", field.name)
            } else {
                field.name.clone()
            };

            let ty = match &field.kind {
                FieldKind::Type(ty) => self.type_link(ty),
                FieldKind::Element(element) => format!("ref {}", self.element_link(element)),
                FieldKind::Inline(inline) => format!("inline{}", self.fields(inline)),
                FieldKind::Untyped => "anyType".to_owned(),
            };

            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&name),
                ty,
                field.occurs,
                if field.nillable { "✓" } else { "" },
                escape(field.documentation.as_deref().unwrap_or_default())
            ));
        }

        html.push_str("</table>");
        html
    }
}

impl Markup for Service {
    fn markup(&self, page: &Page<'_>) -> String {
        let mut html = format!(
            r#"<div class="service" id="{}"><h3>{}</h3>{}"#,
            page.anchors.service(&self.name),
            escape(&self.name.name),
            documentation(self.documentation.as_deref())
        );

        if self.ports.is_empty() {
            html.push_str(r#"<p class="empty">No ports</p>"#);
        } else {
            html.push_str("<table><tr><th>Port</th><th>Binding</th><th>Endpoint</th></tr>");

            for port in &self.ports {
                html.push_str(&format!(
                    r#"<tr><td>{}</td><td>{}</td><td class="endpoint">{}</td></tr>"#,
                    escape(&port.name),
                    page.required_link(port.binding.as_ref(), "binding", |id| {
                        Some(page.anchors.binding(&page.definitions.binding(*id).name))
                    }),
                    escape(port.address.as_deref().unwrap_or("unknown"))
                ));
            }

            html.push_str("</table>");
        }

        html.push_str("</div>\n");
        html
    }
}

impl Markup for Binding {
    fn markup(&self, page: &Page<'_>) -> String {
        let anchor = page.anchors.binding(&self.name);
        let port_type = self
            .port_type
            .as_ref()
            .and_then(Reference::target)
            .map(|id| page.definitions.port_type(*id));

        let mut html = format!(
            r#"<div class="binding" id="{}"><h3>{}</h3>{}"#,
            anchor,
            escape(&self.name.name),
            labelled(
                "Port type",
                &page.required_link(self.port_type.as_ref(), "type", |id| {
                    Some(page.anchors.port_type(&page.definitions.port_type(*id).name))
                })
            )
        );

        if let Some(style) = &self.style {
            html.push_str(&labelled("Style", &escape(style)));
        }

        if let Some(transport) = &self.transport {
            html.push_str(&labelled("Transport", &escape(transport)));
        }

        html.push_str("<table><tr><th>Operation</th><th>SOAPAction</th><th>Style</th></tr>");

        for (position, operation) in self.operations.iter().enumerate() {
            // Only link operations the port type actually declares.
            let declared = port_type.and_then(|port_type| {
                port_type
                    .overload(&operation.name, self.overload_ordinal(position))
                    .map(|declared| (port_type, declared))
            });
            let name = match declared {
                Some((port_type, declared)) => href(
                    &page.anchors.operation(port_type, declared),
                    &operation.name,
                ),
                None => escape(&operation.name).into_owned(),
            };

            let action = operation
                .action
                .as_deref()
                .filter(|action| !action.is_empty())
                .unwrap_or(ABSENT);

            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                name,
                escape(action),
                escape(operation.style.as_deref().unwrap_or(ABSENT))
            ));
        }

        html.push_str("</table>");
        html.push_str(&page.backlinks(&anchor));
        html.push_str("</div>\n");
        html
    }
}

impl Markup for PortType {
    fn markup(&self, page: &Page<'_>) -> String {
        let anchor = page.anchors.port_type(&self.name);
        let message_link = |reference: Option<&Reference<MessageId>>| match reference {
            Some(reference) => page.link(reference, |id| {
                Some(page.anchors.message(&page.definitions.message(*id).name))
            }),
            None => ABSENT.to_owned(),
        };

        let mut html = format!(
            r#"<div class="porttype" id="{}"><h3>{}</h3>{}"#,
            anchor,
            escape(&self.name.name),
            page.backlinks(&anchor)
        );

        for (position, operation) in self.operations.iter().enumerate() {
            html.push_str(&format!(
                r#"<div class="operation" id="{}"><h4>{}</h4>{}"#,
                page.anchors.operation(self, position),
                escape(&operation.name),
                documentation(operation.documentation.as_deref())
            ));

            html.push_str(&format!(
                r#"<p><span class="badge badge-input">Input</span> {} <span class="badge badge-output">Output</span> {}</p>"#,
                message_link(operation.input.as_ref()),
                message_link(operation.output.as_ref())
            ));

            for fault in &operation.faults {
                let name = fault
                    .name
                    .as_deref()
                    .map_or_else(String::new, |name| format!("{}: ", escape(name)));

                html.push_str(&format!(
                    r#"<p><span class="badge badge-fault">Fault</span> {}{}</p>"#,
                    name,
                    message_link(Some(&fault.message))
                ));
            }

            html.push_str(&labelled(
                "SOAPAction",
                &escape(
                    index::soap_action(page.definitions, &self.name, position).unwrap_or(ABSENT),
                ),
            ));
            html.push_str("</div>");
        }

        html.push_str("</div>\n");
        html
    }
}

impl Markup for Message {
    fn markup(&self, page: &Page<'_>) -> String {
        let anchor = page.anchors.message(&self.name);
        let mut html = format!(
            r#"<div class="message" id="{}"><h3>{}</h3>"#,
            anchor,
            escape(&self.name.name)
        );

        if self.parts.is_empty() {
            html.push_str(r#"<p class="empty">No parts</p>"#);
        } else {
            html.push_str("<table><tr><th>Part</th><th>Element/Type</th></tr>");

            for part in &self.parts {
                let target = match &part.kind {
                    PartKind::Element(element) => format!("element: {}", page.element_link(element)),
                    PartKind::Type(ty) => format!("type: {}", page.type_link(ty)),
                    PartKind::Missing => {
                        r#"<span class="missing">no type reference</span>"#.to_owned()
                    }
                };

                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td></tr>",
                    escape(&part.name),
                    target
                ));
            }

            html.push_str("</table>");
        }

        html.push_str(&page.backlinks(&anchor));
        html.push_str("</div>\n");
        html
    }
}

fn type_heading(anchor: &str, name: &str, kind: &str) -> String {
    format!(
        r#"<div class="type" id="{}"><h3>{} <span class="kind">{}</span></h3>"#,
        anchor,
        escape(name),
        kind
    )
}

impl Markup for ComplexType {
    fn markup(&self, page: &Page<'_>) -> String {
        let anchor = page.anchors.complex_type(&self.name);

        let mut html = type_heading(&anchor, &self.name.name, "complexType");
        html.push_str(&documentation(self.documentation.as_deref()));
        html.push_str(&page.fields(&self.content));
        html.push_str(&page.backlinks(&anchor));
        html.push_str("</div>\n");
        html
    }
}

impl Markup for SimpleType {
    fn markup(&self, page: &Page<'_>) -> String {
        let anchor = page.anchors.simple_type(&self.name);

        let mut html = type_heading(&anchor, &self.name.name, "simpleType");
        html.push_str(&documentation(self.documentation.as_deref()));

        if let Some(base) = &self.base {
            html.push_str(&labelled("Base", &page.type_link(base)));
        }

        if !self.enumeration.is_empty() {
            let values: Vec<_> = self
                .enumeration
                .iter()
                .map(|value| format!("<code>{}</code>", escape(value)))
                .collect();

            html.push_str(&labelled("Values", &values.join(", ")));
        }

        html.push_str(&page.backlinks(&anchor));
        html.push_str("</div>\n");
        html
    }
}

impl Markup for Element {
    fn markup(&self, page: &Page<'_>) -> String {
        let anchor = page.anchors.element(&self.name);

        let mut html = type_heading(&anchor, &self.name.name, "element");
        html.push_str(&documentation(self.documentation.as_deref()));

        match &self.kind {
            ElementKind::Inline(content) => html.push_str(&page.fields(content)),
            ElementKind::Type(ty) => html.push_str(&labelled("Type", &page.type_link(ty))),
            ElementKind::Untyped => html.push_str(&labelled("Type", "anyType")),
        }

        html.push_str(&page.backlinks(&anchor));
        html.push_str("</div>\n");
        html
    }
}

impl Markup for Declaration {
    fn markup(&self, page: &Page<'_>) -> String {
        let definitions = page.definitions;

        match *self {
            Declaration::Complex(id) => definitions.complex_type(id).markup(page),
            Declaration::Simple(id) => definitions.simple_type(id).markup(page),
            Declaration::Element(id) => definitions.element(id).markup(page),
        }
    }
}

fn has_diagnostics(definitions: &Definitions) -> bool {
    definitions.unrecognized > 0 || !definitions.diagnostics.is_empty()
}

fn diagnostics(definitions: &Definitions) -> String {
    let items: Vec<_> = definitions
        .diagnostics
        .iter()
        .filter(|diagnostic| !matches!(diagnostic, Diagnostic::UnrecognizedElement { .. }))
        .map(|diagnostic| format!("<li>{}</li>", escape(&diagnostic.to_string())))
        .collect();

    let mut html = String::new();

    if !items.is_empty() {
        html.push_str(&format!(r#"<ul class="diagnostics">{}</ul>"#, items.concat()));
    }

    if definitions.unrecognized > 0 {
        html.push_str(&format!(
            "<p>{} unrecognized element(s) skipped</p>",
            definitions.unrecognized
        ));
    }

    html
}

fn section(id: &str, title: &str, body: String) -> String {
    let body = if body.is_empty() {
        r#"<p class="empty">None</p>"#.to_owned()
    } else {
        body
    };

    format!(
        "<div class=\"section\" id=\"{}\"><h2>{}</h2>\n{}</div>\n",
        anchor::section(id),
        title,
        body
    )
}

fn toc_section(id: &str, title: &str, entries: Vec<(String, String)>) -> String {
    let mut html = format!(r##"<li><a href="#{}">{}</a>"##, anchor::section(id), title);

    if !entries.is_empty() {
        html.push_str("<ul>");

        for (anchor, label) in entries {
            html.push_str(&format!(
                r##"<li><a href="#{}">{}</a></li>"##,
                anchor,
                escape(&label)
            ));
        }

        html.push_str("</ul>");
    }

    html.push_str("</li>\n");
    html
}

fn toc(page: &Page<'_>) -> String {
    let definitions = page.definitions;
    let anchors = page.anchors;

    let mut html = String::from("<nav class=\"toc\"><h3>Contents</h3><ul>\n");

    html.push_str(&toc_section(
        "services",
        "Services",
        definitions
            .services
            .iter()
            .map(|service| (anchors.service(&service.name), service.name.name.clone()))
            .collect(),
    ));
    html.push_str(&toc_section(
        "bindings",
        "Bindings",
        definitions
            .bindings
            .iter()
            .map(|binding| (anchors.binding(&binding.name), binding.name.name.clone()))
            .collect(),
    ));
    html.push_str(&toc_section(
        "operations",
        "Operations",
        definitions
            .port_types
            .iter()
            .flat_map(|port_type| {
                std::iter::once((
                    anchors.port_type(&port_type.name),
                    port_type.name.name.clone(),
                ))
                .chain(port_type.operations.iter().enumerate().map(
                    move |(position, operation)| {
                        (
                            anchors.operation(port_type, position),
                            format!("{}.{}", port_type.name.name, operation.name),
                        )
                    },
                ))
            })
            .collect(),
    ));
    html.push_str(&toc_section(
        "messages",
        "Messages",
        definitions
            .messages
            .iter()
            .map(|message| (anchors.message(&message.name), message.name.name.clone()))
            .collect(),
    ));
    html.push_str(&toc_section(
        "types",
        "Data Types",
        definitions
            .declarations
            .iter()
            .map(|declaration| {
                let name = match *declaration {
                    Declaration::Complex(id) => &definitions.complex_type(id).name,
                    Declaration::Simple(id) => &definitions.simple_type(id).name,
                    Declaration::Element(id) => &definitions.element(id).name,
                };

                (
                    anchors.declaration(definitions, *declaration),
                    name.name.clone(),
                )
            })
            .collect(),
    ));

    if has_diagnostics(definitions) {
        html.push_str(&toc_section("diagnostics", "Diagnostics", Vec::new()));
    }

    html.push_str("</ul></nav>\n");
    html
}

/// Renders the whole model as one HTML document. Every internal link lands
/// on exactly one `id` in the same document.
pub fn html(definitions: &Definitions) -> String {
    let page = Page::new(definitions);
    let title = format!(
        "WSDL Report: {}",
        escape(definitions.name.as_deref().unwrap_or("(unnamed)"))
    );

    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n<h1>{title}</h1>\n",
        title = title,
        style = STYLE
    );

    html.push_str(&labelled(
        "Target namespace",
        &escape(definitions.target_namespace.as_deref().unwrap_or("(none)")),
    ));

    if !definitions.namespaces.is_empty() {
        html.push_str("<table class=\"namespaces\"><tr><th>Prefix</th><th>Namespace</th></tr>");

        for (prefix, uri) in &definitions.namespaces {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(prefix.as_deref().unwrap_or("(default)")),
                escape(uri)
            ));
        }

        html.push_str("</table>\n");
    }

    html.push_str(&toc(&page));
    html.push_str(&section(
        "services",
        "Services",
        markup_all(&definitions.services, &page),
    ));
    html.push_str(&section(
        "bindings",
        "Bindings",
        markup_all(&definitions.bindings, &page),
    ));
    html.push_str(&section(
        "operations",
        "Operations",
        markup_all(&definitions.port_types, &page),
    ));
    html.push_str(&section(
        "messages",
        "Messages",
        markup_all(&definitions.messages, &page),
    ));
    html.push_str(&section(
        "types",
        "Data Types",
        markup_all(&definitions.declarations, &page),
    ));

    if has_diagnostics(definitions) {
        html.push_str(&section("diagnostics", "Diagnostics", diagnostics(definitions)));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}
