//! Cursor-based pagination over generic host types.

use pretty_assertions::assert_eq;
use typegraph::{
    HostType, HostTypes, SchemaDefinition, SchemaModel, Shape, SourcePosition, compile,
    ast::{Arguments, Definition, Field, InputValue},
    definition::{OperationDef, Resolver},
    host::Member,
    meta::MetaType,
    validate_document,
};

fn schema() -> SchemaModel {
    let mut hosts = HostTypes::new();
    let person = hosts.declare(
        HostType::class("demo.Person")
            .property("name", Shape::raw(HostTypes::STRING))
            .property("email", Shape::raw(HostTypes::STRING).nullable()),
    );
    let page_info = hosts.declare(
        HostType::class("demo.paging.PageInfo")
            .property("hasNextPage", Shape::raw(HostTypes::BOOLEAN))
            .property("endCursor", Shape::raw(HostTypes::STRING).nullable()),
    );
    let edge = hosts.declare(HostType::class("demo.paging.Edge").type_param("T"));
    hosts[edge].push_member(Member::new("node", Shape::variable(edge, "T")));
    hosts[edge].push_member(Member::new("cursor", Shape::raw(HostTypes::STRING)));
    let connection = hosts.declare(HostType::class("demo.paging.Connection").type_param("T"));
    hosts[connection].push_member(Member::new(
        "edges",
        Shape::list_of(Shape::parameterized(edge, vec![Shape::variable(connection, "T")])),
    ));
    hosts[connection].push_member(Member::new("pageInfo", Shape::raw(page_info)));

    let people = Resolver::new("people")
        .param("first", Shape::raw(HostTypes::INT).nullable())
        .param("after", Shape::raw(HostTypes::STRING).nullable())
        .returns(Shape::parameterized(connection, vec![Shape::raw(person)]));
    let tags = Resolver::new("tags")
        .param("first", Shape::raw(HostTypes::INT))
        .returns(Shape::parameterized(connection, vec![Shape::raw(HostTypes::STRING)]));

    let definition = SchemaDefinition::new(hosts)
        .query(OperationDef::new("people", people))
        .query(OperationDef::new("tags", tags));
    compile(&definition).expect("pagination schema compiles")
}

#[test]
fn resolves_nested_generic_types() {
    let schema = schema();

    let edges = |connection: &str| {
        schema
            .type_by_name(connection)
            .and_then(|t| t.field_by_name("edges"))
            .map(|f| schema.display(&f.field_type).to_string())
    };
    assert_eq!(edges("Connection<Person>").as_deref(), Some("[Edge<Person>!]!"));
    assert_eq!(edges("Connection<String>").as_deref(), Some("[Edge<String>!]!"));

    let node = schema
        .type_by_name("Edge<Person>")
        .and_then(|t| t.field_by_name("node"))
        .map(|f| schema.display(&f.field_type).to_string());
    assert_eq!(node.as_deref(), Some("Person!"));

    let page_infos = schema
        .type_list()
        .filter(|t| t.name() == "PageInfo")
        .count();
    assert_eq!(page_infos, 1);
    assert!(matches!(schema.type_by_name("PageInfo"), Some(MetaType::Object(_))));
}

#[test]
fn validates_paginated_requests() {
    let schema = schema();
    let at = SourcePosition::new_origin();
    let missing = SourcePosition::new(40, 3, 2);

    let document = [Definition::query(vec![
        Field::new("people", at)
            .arguments(Arguments::default().with("first", InputValue::Int(10)))
            .selection_set(vec![
                Field::new("edges", at)
                    .selection_set(vec![
                        Field::new("cursor", at).into_selection(),
                        Field::new("node", at)
                            .selection_set(vec![Field::new("name", at).into_selection()])
                            .into_selection(),
                    ])
                    .into_selection(),
                Field::new("pageInfo", at)
                    .selection_set(vec![Field::new("hasNextPage", at).into_selection()])
                    .into_selection(),
            ])
            .into_selection(),
        Field::new("tags", missing)
            .selection_set(vec![Field::new("pageInfo", at)
                .selection_set(vec![Field::new("endCursor", at).into_selection()])
                .into_selection()])
            .into_selection(),
    ])];

    let error = validate_document(&schema, &document).expect_err("tags needs its first argument");

    assert_eq!(error.errors().len(), 1);
    assert_eq!(
        error.errors()[0].message(),
        "Missing value for non-nullable argument first on the field 'tags'",
    );
    assert_eq!(error.errors()[0].locations(), [missing]);
}
