//! Namespace-aware element tree over the quick-xml event stream.
//!
//! The builder only ever sees [`Node`] handles: local names, resolved
//! namespace URIs, attributes and collapsed text. Prefix bindings are kept
//! per element scope so qualified-name attribute values (`tns:Foo`) are
//! expanded with the declarations in effect where they were written.

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{error::Error, types::QName};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, local_name)) => (Some(prefix), local_name),
        None => (None, prefixed_name),
    }
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<usize>,
    bindings: Vec<(Option<String>, String)>,
}

#[derive(Debug)]
enum Content {
    Element(usize),
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
    content: Vec<Content>,
    scope: usize,
    declares: bool,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    scopes: Vec<Scope>,
}

/// A borrowed element handle. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    document: &'a Document,
    index: usize,
}

impl Document {
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut document = Self {
            nodes: Vec::new(),
            scopes: vec![Scope::default()],
        };

        let mut reader = Reader::from_str(source);
        let mut buffer = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => {
                    let index = document.open_element(&reader, &start, open.last().copied())?;
                    open.push(index);
                }

                Event::Empty(start) => {
                    document.open_element(&reader, &start, open.last().copied())?;
                }

                Event::End(..) => {
                    open.pop();
                }

                Event::Text(text) => {
                    if let Some(&parent) = open.last() {
                        let unescaped = text.unescaped()?;
                        let text = reader.decode(&unescaped)?;
                        document.push_text(parent, text);
                    }
                }

                Event::CData(cdata) => {
                    if let Some(&parent) = open.last() {
                        let text = reader.decode(&cdata)?;
                        document.push_text(parent, text);
                    }
                }

                Event::Eof => break,

                _ => (),
            }

            buffer.clear();
        }

        if let Some(&index) = open.last() {
            return Err(Error::UnclosedElement(document.nodes[index].local_name.clone()));
        }

        if document.nodes.is_empty() {
            return Err(Error::EmptyDocument);
        }

        Ok(document)
    }

    /// The first top-level element.
    pub fn root(&self) -> Node<'_> {
        Node {
            document: self,
            index: 0,
        }
    }

    fn open_element(
        &mut self,
        reader: &Reader<&[u8]>,
        start: &BytesStart<'_>,
        parent: Option<usize>,
    ) -> Result<usize, Error> {
        let mut attributes = Vec::new();
        let mut bindings = Vec::new();

        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = reader.decode(attribute.key)?;
            let value = attribute.unescaped_value()?;
            let value = reader.decode(&value)?.to_owned();

            match split_namespaced_name(key) {
                (None, "xmlns") => bindings.push((None, value)),
                (Some("xmlns"), prefix) => bindings.push((Some(prefix.to_owned()), value)),
                _ => attributes.push((key.to_owned(), value)),
            }
        }

        let parent_scope = parent.map_or(0, |parent| self.nodes[parent].scope);
        let declares = !bindings.is_empty();
        let scope = if declares {
            self.scopes.push(Scope {
                parent: Some(parent_scope),
                bindings,
            });
            self.scopes.len() - 1
        } else {
            parent_scope
        };

        let name = reader.decode(start.name())?;
        let (prefix, local_name) = split_namespaced_name(name);
        let namespace = match prefix {
            Some(prefix) => Some(self.lookup(scope, Some(prefix)).ok_or_else(|| {
                Error::UnboundPrefix {
                    prefix: prefix.to_owned(),
                    value: name.to_owned(),
                }
            })?),
            None => self.lookup(scope, None),
        }
        .map(ToOwned::to_owned);

        let index = self.nodes.len();
        self.nodes.push(NodeData {
            namespace,
            local_name: local_name.to_owned(),
            attributes,
            content: Vec::new(),
            scope,
            declares,
        });

        if let Some(parent) = parent {
            self.nodes[parent].content.push(Content::Element(index));
        }

        Ok(index)
    }

    fn push_text(&mut self, parent: usize, text: &str) {
        self.nodes[parent].content.push(Content::Text(text.to_owned()));
    }

    fn lookup(&self, mut scope: usize, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }

        loop {
            let current = &self.scopes[scope];

            // Later declarations on the same element win.
            if let Some((_, uri)) = current
                .bindings
                .iter()
                .rev()
                .find(|(bound, _)| bound.as_deref() == prefix)
            {
                // `xmlns=""` undeclares the default namespace.
                return if uri.is_empty() { None } else { Some(uri) };
            }

            scope = current.parent?;
        }
    }
}

impl<'a> Node<'a> {
    fn data(self) -> &'a NodeData {
        &self.document.nodes[self.index]
    }

    pub fn local_name(self) -> &'a str {
        &self.data().local_name
    }

    pub fn namespace(self) -> Option<&'a str> {
        self.data().namespace.as_deref()
    }

    pub fn is(self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local_name
    }

    pub fn qname(self) -> QName {
        QName::new(self.namespace(), self.local_name())
    }

    pub fn attribute(self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attribute_or(self, name: &str, default: &'a str) -> &'a str {
        self.attribute(name).unwrap_or(default)
    }

    pub fn children(self) -> impl Iterator<Item = Node<'a>> + 'a {
        let document = self.document;

        self.data().content.iter().filter_map(move |content| match content {
            Content::Element(index) => Some(Node {
                document,
                index: *index,
            }),
            Content::Text(_) => None,
        })
    }

    pub fn children_named(
        self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children()
            .filter(move |child| child.is(namespace, local_name))
    }

    pub fn child(self, namespace: &str, local_name: &str) -> Option<Node<'a>> {
        self.children().find(|child| child.is(namespace, local_name))
    }

    /// Descendant text in document order with whitespace runs collapsed to
    /// single spaces and the ends trimmed. Child element boundaries add no
    /// whitespace of their own.
    pub fn text(self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(self, into: &mut String) {
        for content in &self.data().content {
            match content {
                Content::Text(text) => into.push_str(text),
                Content::Element(index) => Node {
                    document: self.document,
                    index: *index,
                }
                .collect_text(into),
            }
        }
    }

    /// Prefix bindings declared directly on this element, in source order.
    pub fn namespace_declarations(self) -> &'a [(Option<String>, String)] {
        let data = self.data();

        if data.declares {
            &self.document.scopes[data.scope].bindings
        } else {
            &[]
        }
    }

    /// Expands a `prefix:local` attribute value with the bindings in scope
    /// at this element. An unprefixed value takes the default namespace.
    pub fn resolve_qname(self, value: &str) -> Result<QName, Error> {
        let value = value.trim();
        let (prefix, local_name) = split_namespaced_name(value);
        let namespace = self.document.lookup(self.data().scope, prefix);

        match (prefix, namespace) {
            (Some(prefix), None) => Err(Error::UnboundPrefix {
                prefix: prefix.to_owned(),
                value: value.to_owned(),
            }),
            (_, namespace) => Ok(QName::new(namespace, local_name)),
        }
    }
}
