//! Stable HTML anchor identifiers.
//!
//! An identifier is the entity kind followed by its escaped local name, with
//! the escaped namespace appended when it differs from the document's target
//! namespace. Only ASCII alphanumerics pass through unescaped, so `-` can
//! separate the pieces without ambiguity. Overloaded operations get a
//! `_{n}` suffix. An escaped `_` is always `__` or `_{hex}_`, so the suffix
//! never reads as part of a name.

use suds_wsdl::types::{Declaration, Definitions, PortType, QName, TypeTarget};

fn escape_id(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => escaped.push(c),
            '_' => escaped.push_str("__"),
            c => escaped.push_str(&format!("_{:x}_", c as u32)),
        }
    }

    escaped
}

pub fn section(name: &str) -> String {
    format!("section-{}", name)
}

#[derive(Debug, Clone, Copy)]
pub struct Anchors<'a> {
    target_namespace: Option<&'a str>,
}

impl<'a> Anchors<'a> {
    pub fn new(definitions: &'a Definitions) -> Self {
        Self {
            target_namespace: definitions.target_namespace.as_deref(),
        }
    }

    fn qualified(&self, name: &QName) -> String {
        let namespace = name.namespace.as_deref();

        if namespace == self.target_namespace {
            escape_id(&name.name)
        } else {
            format!(
                "{}-{}",
                escape_id(&name.name),
                escape_id(namespace.unwrap_or_default())
            )
        }
    }

    fn entity(&self, kind: &str, name: &QName) -> String {
        format!("{}-{}", kind, self.qualified(name))
    }

    pub fn service(&self, name: &QName) -> String {
        self.entity("service", name)
    }

    pub fn binding(&self, name: &QName) -> String {
        self.entity("binding", name)
    }

    pub fn port_type(&self, name: &QName) -> String {
        self.entity("porttype", name)
    }

    /// The operation at `position` in `port_type`.
    pub fn operation(&self, port_type: &PortType, position: usize) -> String {
        let name = &port_type.operations[position].name;
        let anchor = format!(
            "operation-{}-{}",
            self.qualified(&port_type.name),
            escape_id(name)
        );

        if port_type.is_overloaded(name) {
            format!("{}_{}", anchor, port_type.overload_ordinal(position) + 1)
        } else {
            anchor
        }
    }

    pub fn message(&self, name: &QName) -> String {
        self.entity("message", name)
    }

    pub fn complex_type(&self, name: &QName) -> String {
        self.entity("complextype", name)
    }

    pub fn simple_type(&self, name: &QName) -> String {
        self.entity("simpletype", name)
    }

    pub fn element(&self, name: &QName) -> String {
        self.entity("element", name)
    }

    /// `None` for built-in types, which have nothing to land on.
    pub fn type_target(&self, definitions: &Definitions, target: TypeTarget) -> Option<String> {
        match target {
            TypeTarget::Primitive(_) => None,
            TypeTarget::Complex(id) => Some(self.complex_type(&definitions.complex_type(id).name)),
            TypeTarget::Simple(id) => Some(self.simple_type(&definitions.simple_type(id).name)),
            TypeTarget::Element(id) => Some(self.element(&definitions.element(id).name)),
        }
    }

    pub fn declaration(&self, definitions: &Definitions, declaration: Declaration) -> String {
        match declaration {
            Declaration::Complex(id) => self.complex_type(&definitions.complex_type(id).name),
            Declaration::Simple(id) => self.simple_type(&definitions.simple_type(id).name),
            Declaration::Element(id) => self.element(&definitions.element(id).name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use suds_wsdl::types::Operation;

    fn port_type(operations: &[&str]) -> PortType {
        PortType {
            name: QName::new(Some("urn:t"), "UserPort"),
            operations: operations
                .iter()
                .map(|name| Operation {
                    name: (*name).into(),
                    documentation: None,
                    input: None,
                    output: None,
                    faults: Vec::new(),
                })
                .collect(),
        }
    }

    fn definitions() -> Definitions {
        Definitions {
            target_namespace: Some("urn:t".into()),
            ..Default::default()
        }
    }

    #[test]
    fn target_namespace_ids_are_short() {
        let definitions = definitions();
        let anchors = Anchors::new(&definitions);

        assert_eq!(
            anchors.message(&QName::new(Some("urn:t"), "GetUserRequest")),
            "message-GetUserRequest"
        );
        assert_eq!(
            anchors.operation(&port_type(&["GetUser"]), 0),
            "operation-UserPort-GetUser"
        );
    }

    #[test]
    fn foreign_namespaces_are_appended() {
        let definitions = definitions();
        let anchors = Anchors::new(&definitions);

        assert_eq!(
            anchors.complex_type(&QName::new(Some("urn:x"), "User")),
            "complextype-User-urn_3a_x"
        );
        assert_eq!(anchors.element(&QName::new(None, "User")), "element-User-");
    }

    #[test]
    fn overloaded_operations_are_numbered() {
        let definitions = definitions();
        let anchors = Anchors::new(&definitions);
        let port_type = port_type(&["Find", "Count", "Find", "Find_1"]);

        let ids: Vec<_> = (0..4)
            .map(|position| anchors.operation(&port_type, position))
            .collect();

        assert_eq!(
            ids,
            [
                "operation-UserPort-Find_1",
                "operation-UserPort-Count",
                "operation-UserPort-Find_2",
                "operation-UserPort-Find__1",
            ]
        );
    }

    #[test]
    fn escaping_keeps_distinct_names_distinct() {
        assert_eq!(escape_id("a.b"), "a_2e_b");
        assert_eq!(escape_id("a_b"), "a__b");
        assert_eq!(escape_id("a-b"), "a_2d_b");
        assert_ne!(escape_id("a_2e_b"), escape_id("a.b"));
    }
}
