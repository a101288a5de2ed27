//! End-to-end tests: document text in, resolved model out.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use suds_wsdl::{
    error::Error,
    types::{
        Content, Definitions, Diagnostic, ElementKind, EntityKind, FieldKind, Link, MaxOccurs,
        MessageId, PartKind, PortTypeId, QName, TypeTarget,
    },
};

fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn users() -> Definitions {
    suds_wsdl::parse(load_fixture("users.wsdl")).expect("users.wsdl should parse")
}

fn is_settled<T>(link: &Link<T>) -> bool {
    !matches!(link, Link::Pending)
}

fn content_settled(content: &Content) -> bool {
    content.base.iter().all(|base| is_settled(&base.link))
        && content.fields.iter().all(|field| match &field.kind {
            FieldKind::Type(ty) => is_settled(&ty.link),
            FieldKind::Element(element) => is_settled(&element.link),
            FieldKind::Inline(inline) => content_settled(inline),
            FieldKind::Untyped => true,
        })
}

#[test]
fn every_reference_is_resolved_or_tagged() {
    let definitions = users();

    for service in &definitions.services {
        assert!(service
            .ports
            .iter()
            .filter_map(|port| port.binding.as_ref())
            .all(|binding| is_settled(&binding.link)));
    }

    for binding in &definitions.bindings {
        assert!(binding
            .port_type
            .iter()
            .all(|port_type| is_settled(&port_type.link)));
    }

    for port_type in &definitions.port_types {
        for operation in &port_type.operations {
            let messages = operation
                .input
                .iter()
                .chain(operation.output.iter())
                .chain(operation.faults.iter().map(|fault| &fault.message));

            for message in messages {
                assert!(is_settled(&message.link), "{} left pending", message.name);
            }
        }
    }

    for message in &definitions.messages {
        for part in &message.parts {
            match &part.kind {
                PartKind::Element(element) => assert!(is_settled(&element.link)),
                PartKind::Type(ty) => assert!(is_settled(&ty.link)),
                PartKind::Missing => (),
            }
        }
    }

    assert!(definitions
        .complex_types
        .iter()
        .all(|ty| content_settled(&ty.content)));
    assert!(definitions.elements.iter().all(|element| match &element.kind {
        ElementKind::Inline(content) => content_settled(content),
        ElementKind::Type(ty) => is_settled(&ty.link),
        ElementKind::Untyped => true,
    }));
}

#[test]
fn messages_keep_count_and_order() {
    let definitions = users();
    let names: Vec<_> = definitions
        .messages
        .iter()
        .map(|message| message.name.name.as_str())
        .collect();

    assert_eq!(
        names,
        [
            "GetUserRequest",
            "GetUserResponse",
            "DeleteUserResponse",
            "UserFault",
            "Legacy"
        ]
    );
}

#[test]
fn part_without_reference_is_kept() {
    let definitions = users();
    let legacy = &definitions.messages[4];

    assert_eq!(legacy.parts.len(), 1);
    assert!(matches!(legacy.parts[0].kind, PartKind::Missing));
}

#[test]
fn binding_resolves_to_port_type_declared_later() {
    let definitions = users();
    let binding = &definitions.bindings[0];
    let id = *binding.port_type.as_ref().unwrap().target().unwrap();

    assert_eq!(definitions.port_type(id).name.name, "UserPortType");
    assert_eq!(definitions.soap_action(id, 0), Some("urn:GetUser"));
    assert_eq!(definitions.soap_action(id, 1), None);
    assert_eq!(definitions.soap_action(id, 2), None);
}

#[test]
fn broken_input_is_isolated() {
    let definitions = users();
    let operations = &definitions.port_types[0].operations;

    assert!(operations[1].input.as_ref().unwrap().is_unresolved());
    assert_eq!(
        operations[1].output.as_ref().unwrap().link,
        Link::Resolved(MessageId(2))
    );
    assert_eq!(
        operations[0].input.as_ref().unwrap().link,
        Link::Resolved(MessageId(0))
    );
}

#[test]
fn unbounded_and_local_type_references() {
    let definitions = users();
    let user = &definitions.complex_types[0];
    let fields = &user.content.fields;

    assert_eq!(
        user.documentation.as_deref(),
        Some("A user account as stored in the directory.")
    );
    assert_eq!(fields[1].occurs.max, MaxOccurs::Unbounded);
    assert_eq!(fields[1].documentation.as_deref(), Some("Granted roles."));

    match &fields[2].kind {
        FieldKind::Type(ty) => {
            assert_eq!(ty.written, "tns:Address");
            assert!(matches!(ty.link, Link::Resolved(TypeTarget::Complex(_))));
        }
        other => panic!("unexpected field kind {:?}", other),
    }

    match &fields[3].kind {
        FieldKind::Type(ty) => assert!(matches!(ty.link, Link::Resolved(TypeTarget::Simple(_)))),
        other => panic!("unexpected field kind {:?}", other),
    }
}

#[test]
fn diagnostics_cover_every_soft_failure() {
    let definitions = users();

    assert_eq!(definitions.unrecognized, 1);
    assert_eq!(definitions.unresolved_count(), 2);
    assert!(definitions
        .diagnostics
        .contains(&Diagnostic::UnresolvedReference {
            kind: EntityKind::Binding,
            target: QName::new(Some("urn:example:users"), "UserBinding12"),
            referrer: "port UserSoap12 of service UserService".into(),
        }));
    assert!(definitions
        .diagnostics
        .contains(&Diagnostic::MissingPartReference {
            message: "Legacy".into(),
            part: "blob".into(),
        }));
}

#[test]
fn duplicate_entities_are_rejected() {
    let result = suds_wsdl::parse(load_fixture("duplicate.wsdl"));

    match result {
        Err(Error::DuplicateEntity { kind, name }) => {
            assert_eq!(kind, EntityKind::Message);
            assert_eq!(name, QName::new(Some("urn:dup"), "Ping"));
        }
        other => panic!("expected duplicate error, got {:?}", other),
    }
}

#[test]
fn malformed_xml_is_fatal() {
    let error = suds_wsdl::parse("<definitions><message></definitions>").unwrap_err();
    assert!(error.is_malformed_document());
}

#[test]
fn port_resolves_to_binding_without_type() {
    let definitions = suds_wsdl::parse(
        r#"<definitions targetNamespace="urn:p" xmlns="http://schemas.xmlsoap.org/wsdl/"
            xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/" xmlns:tns="urn:p">
          <binding name="B"><soap:binding style="document"/></binding>
          <service name="S">
            <port name="P" binding="tns:B"><soap:address location="http://p"/></port>
            <port name="Q"/>
          </service>
        </definitions>"#,
    )
    .unwrap();

    assert_eq!(definitions.bindings.len(), 1);
    assert!(definitions.bindings[0].port_type.is_none());

    let ports = &definitions.services[0].ports;
    assert_eq!(ports.len(), 2);
    assert!(matches!(
        ports[0].binding.as_ref().unwrap().link,
        Link::Resolved(_)
    ));
    assert!(ports[1].binding.is_none());

    assert_eq!(definitions.unresolved_count(), 0);
    assert_eq!(definitions.unrecognized, 0);
    assert!(definitions.diagnostics.contains(&Diagnostic::MissingReference {
        referrer: "binding B".into(),
        attribute: "type",
    }));
    assert!(definitions.diagnostics.contains(&Diagnostic::MissingReference {
        referrer: "port Q of service S".into(),
        attribute: "binding",
    }));
}

#[test]
fn overloaded_operations_parse_and_keep_their_actions() {
    let definitions = suds_wsdl::parse(load_fixture("overload.wsdl")).unwrap();
    let operations = &definitions.port_types[0].operations;

    let names: Vec<_> = operations.iter().map(|operation| operation.name.as_str()).collect();
    assert_eq!(names, ["Find", "Find", "Count"]);
    assert_eq!(
        operations[1].input.as_ref().unwrap().link,
        Link::Resolved(MessageId(1))
    );

    assert_eq!(definitions.soap_action(PortTypeId(0), 0), Some("urn:FindById"));
    assert_eq!(definitions.soap_action(PortTypeId(0), 1), Some("urn:FindByName"));
    assert_eq!(definitions.soap_action(PortTypeId(0), 2), Some("urn:Count"));
    assert_eq!(definitions.unresolved_count(), 0);
}
