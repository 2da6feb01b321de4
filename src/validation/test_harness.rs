use pretty_assertions::assert_eq;

use crate::{
    ast::{Definition, Document, OwnedDocument, Selection},
    parser::SourcePosition,
    schema::model::SchemaModel,
    tests::fixtures::films::Films,
    validation::{RuleError, validate_document},
};

pub(crate) fn schema() -> SchemaModel {
    let (definition, _) = Films::definition();
    crate::compile(&definition).expect("films schema compiles")
}

/// Single anonymous query over the given selections.
pub(crate) fn query(selections: Vec<Selection<'_>>) -> OwnedDocument<'_> {
    vec![Definition::query(selections)]
}

pub(crate) fn expect_passes(document: &Document<'_>) {
    let schema = schema();
    if let Err(e) = validate_document(&schema, document) {
        panic!("Expected rules to pass, but errors found:\n{e}");
    }
}

pub(crate) fn expect_fails(document: &Document<'_>, expected: &[(&str, &[SourcePosition])]) {
    let schema = schema();
    let mut expected = expected
        .iter()
        .map(|(message, locations)| RuleError::new(message, locations))
        .collect::<Vec<_>>();
    expected.sort();

    match validate_document(&schema, document) {
        Ok(()) => panic!("Expected rules to fail, but no errors were found"),
        Err(e) => assert_eq!(e.into_errors(), expected),
    }
}
