use pretty_assertions::assert_eq;

use crate::{
    ast::{Arguments, Field, InputValue, Selection},
    compile,
    definition::{OperationDef, Resolver, SchemaDefinition},
    host::HostTypes,
    parser::{SourcePosition, Spanning},
    shape::Shape,
    tests::fixtures::films::Films,
    validation::validate_field,
};

#[test]
fn aggregates_every_argument_violation_of_a_field() {
    let definition = SchemaDefinition::new(HostTypes::new()).query(OperationDef::new(
        "rate",
        Resolver::new("rate")
            .param("film", Shape::raw(HostTypes::STRING))
            .param("stars", Shape::raw(HostTypes::INT))
            .returns(Shape::raw(HostTypes::BOOLEAN)),
    ));
    let model = compile(&definition).expect("schema compiles");
    let query = model.query_type();
    let rate = query.field_by_name("rate").expect("rate is declared");

    let at = SourcePosition::new(0, 0, 0);
    let comment = SourcePosition::new(5, 0, 5);
    let mut node = Field::new("rate", at);
    node.arguments = Some(Spanning::zero_width(
        &at,
        Arguments {
            items: vec![(
                Spanning::zero_width(&comment, "comment"),
                Spanning::zero_width(&comment, InputValue::String("great".into())),
            )],
        },
    ));

    let error = validate_field(&model, query, rate, &Spanning::zero_width(&at, node))
        .expect_err("arguments are invalid");

    let messages = error.errors().iter().map(|e| e.message()).collect::<Vec<_>>();
    assert_eq!(
        messages,
        [
            "Missing value for non-nullable argument film on the field 'rate'",
            "Missing value for non-nullable argument stars on the field 'rate'",
            "rate does support arguments [film, stars]. Found arguments [comment]",
        ],
    );
    assert_eq!(error.errors()[2].locations(), [comment]);
    assert_eq!(error.to_string().lines().count(), 3);
}

#[test]
fn union_fields_only_accept_fragments_and_typename() {
    let (definition, _) = Films::definition();
    let model = compile(&definition).expect("films schema compiles");
    let query = model.query_type();
    let search = query.field_by_name("search").expect("search is declared");

    let at = SourcePosition::new_origin();
    let title = SourcePosition::new(12, 1, 4);
    let year = SourcePosition::new(20, 2, 4);
    let select = |selections| {
        Spanning::zero_width(&at, Field::new("search", at).selection_set(selections))
    };

    let error = validate_field(
        &model,
        query,
        search,
        &select(vec![
            Field::new("title", title).into_selection(),
            Field::new("__typename", at).into_selection(),
            Field::new("year", year).into_selection(),
        ]),
    )
    .expect_err("plain fields are selected on a union");
    assert_eq!(
        error.errors()[0].message(),
        "Invalid selection set with properties: [title, year] on union type property search : \
         [Film, Director]",
    );
    assert_eq!(error.errors()[0].locations(), [title, year]);

    assert_eq!(
        validate_field(
            &model,
            query,
            search,
            &select(vec![
                Field::new("__typename", at).into_selection(),
                Selection::inline(Some("Film"), vec![Field::new("title", at).into_selection()], at),
                Selection::spread("DirectorFields", at),
            ]),
        ),
        Ok(()),
    );
}

#[test]
fn valid_requests_pass() {
    let (definition, _) = Films::definition();
    let model = compile(&definition).expect("films schema compiles");
    let query = model.query_type();
    let film = query.field_by_name("film").expect("film is declared");

    let at = SourcePosition::new_origin();
    let node = Field::new("film", at)
        .arguments(Arguments::default().with("title", InputValue::String("Heat".into())))
        .selection_set(vec![Field::new("title", at).into_selection()]);

    assert_eq!(validate_field(&model, query, film, &Spanning::zero_width(&at, node)), Ok(()));
}
