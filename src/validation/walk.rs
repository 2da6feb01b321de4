//! Walk of a request document over the compiled schema.
//!
//! Every selection is checked against the type it is made on: unknown
//! fields, leaf and composite selection shapes, fragment spreads and type
//! conditions, and directive usage. Field and directive arguments are
//! delegated to the [`arguments`] rule.

use crate::{
    ast::{Definition, Directive, Document, Field, OperationType, Selection},
    definition::DirectiveLocation,
    parser::Spanning,
    schema::meta::MetaType,
    validation::{
        ValidatorContext,
        rules::{abstract_selections, arguments, no_fragment_cycles},
    },
};

pub(crate) fn visit_document<'a>(ctx: &mut ValidatorContext<'a>, document: &'a Document<'a>) {
    let schema = ctx.schema;
    for def in document {
        match def {
            Definition::Operation(op) => {
                let (root, location) = match op.item.operation_type {
                    OperationType::Query => (Some(schema.query_type()), DirectiveLocation::Query),
                    OperationType::Mutation => (schema.mutation_type(), DirectiveLocation::Mutation),
                    OperationType::Subscription => {
                        (schema.subscription_type(), DirectiveLocation::Subscription)
                    }
                };
                visit_directives(ctx, op.item.directives.as_deref(), location);
                match root {
                    Some(root) => visit_selection_set(ctx, root, &op.item.selection_set, false),
                    None => ctx.report_error(
                        &missing_root_message(op.item.operation_type),
                        &[op.span.start],
                    ),
                }
            }
            Definition::Fragment(fragment) => {
                visit_directives(
                    ctx,
                    fragment.item.directives.as_deref(),
                    DirectiveLocation::FragmentDefinition,
                );
                let condition = &fragment.item.type_condition;
                match schema.type_by_name(condition.item) {
                    None => ctx.report_error(&unknown_type_message(condition.item), &[condition.span.start]),
                    Some(t) if !t.is_composite() => ctx.report_error(
                        &non_composite_message(Some(fragment.item.name.item), condition.item),
                        &[condition.span.start],
                    ),
                    Some(t) => visit_selection_set(ctx, t, &fragment.item.selection_set, false),
                }
            }
        }
    }

    no_fragment_cycles::validate(ctx, document);
}

/// Visits the selections made on `parent`.
///
/// Plain fields of an abstract type were already reported by the
/// [`abstract_selections`] rule when `skip_plain_fields` is set.
fn visit_selection_set<'a>(
    ctx: &mut ValidatorContext<'a>,
    parent: &'a MetaType,
    selections: &'a [Selection<'a>],
    skip_plain_fields: bool,
) {
    let schema = ctx.schema;
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let is_plain = field.item.name.item != "__typename";
                if !(skip_plain_fields && is_plain) {
                    visit_field(ctx, parent, field);
                }
            }
            Selection::FragmentSpread(spread) => {
                visit_directives(
                    ctx,
                    spread.item.directives.as_deref(),
                    DirectiveLocation::FragmentSpread,
                );
                let name = &spread.item.name;
                let Some(fragment) = ctx.fragment(name.item) else {
                    ctx.report_error(&unknown_fragment_message(name.item), &[name.span.start]);
                    continue;
                };
                if let Some(fragment_type) = schema.type_by_name(fragment.item.type_condition.item) {
                    if fragment_type.is_composite() && !schema.type_overlap(parent, fragment_type) {
                        ctx.report_error(
                            &impossible_spread_message(Some(name.item), parent.name(), fragment_type.name()),
                            &[spread.span.start],
                        );
                    }
                }
            }
            Selection::InlineFragment(inline) => {
                visit_directives(
                    ctx,
                    inline.item.directives.as_deref(),
                    DirectiveLocation::InlineFragment,
                );
                let on = match &inline.item.type_condition {
                    None => Some(parent),
                    Some(condition) => match schema.type_by_name(condition.item) {
                        None => {
                            ctx.report_error(
                                &unknown_type_message(condition.item),
                                &[condition.span.start],
                            );
                            None
                        }
                        Some(t) if !t.is_composite() => {
                            ctx.report_error(
                                &non_composite_message(None, condition.item),
                                &[condition.span.start],
                            );
                            None
                        }
                        Some(t) => {
                            if !schema.type_overlap(parent, t) {
                                ctx.report_error(
                                    &impossible_spread_message(None, parent.name(), t.name()),
                                    &[inline.span.start],
                                );
                            }
                            Some(t)
                        }
                    },
                };
                if let Some(on) = on {
                    let untyped = inline.item.type_condition.is_none();
                    visit_selection_set(
                        ctx,
                        on,
                        &inline.item.selection_set,
                        untyped && skip_plain_fields,
                    );
                }
            }
        }
    }
}

fn visit_field<'a>(
    ctx: &mut ValidatorContext<'a>,
    parent: &'a MetaType,
    field: &'a Spanning<Field<'a>>,
) {
    let schema = ctx.schema;
    let name = field.item.name.item;

    visit_directives(ctx, field.item.directives.as_deref(), DirectiveLocation::Field);

    let Some(meta_field) = parent.field_by_name(name) else {
        ctx.report_error(&unknown_field_message(name, parent.name()), &[field.span.start]);
        return;
    };

    arguments::validate_field(ctx, parent, meta_field, field);
    abstract_selections::validate(ctx, meta_field, field);

    let Some(field_type) = schema.type_by_id(meta_field.field_type.innermost()) else {
        return;
    };
    match &field.item.selection_set {
        Some(_) if field_type.is_leaf() => ctx.report_error(
            &no_allowed_selection_message(name, &schema.display(&meta_field.field_type).to_string()),
            &[field.span.start],
        ),
        None if field_type.is_composite() => ctx.report_error(
            &required_selection_message(name, &schema.display(&meta_field.field_type).to_string()),
            &[field.span.start],
        ),
        Some(selections) => {
            visit_selection_set(ctx, field_type, selections, field_type.is_abstract());
        }
        None => {}
    }
}

fn visit_directives<'a>(
    ctx: &mut ValidatorContext<'a>,
    directives: Option<&'a [Spanning<Directive<'a>>]>,
    location: DirectiveLocation,
) {
    let schema = ctx.schema;
    for directive in directives.into_iter().flatten() {
        let name = directive.item.name.item;
        let Some(directive_type) = schema.directive_by_name(name) else {
            ctx.report_error(&unknown_directive_message(name), &[directive.span.start]);
            continue;
        };
        if !directive_type.locations.contains(&location) {
            ctx.report_error(
                &misplaced_directive_message(name, location),
                &[directive.span.start],
            );
        }
        arguments::validate_directive(ctx, directive_type, directive);
    }
}

fn missing_root_message(operation_type: OperationType) -> String {
    let kind = match operation_type {
        OperationType::Query => "queries",
        OperationType::Mutation => "mutations",
        OperationType::Subscription => "subscriptions",
    };
    format!("Schema is not configured for {kind}")
}

fn unknown_field_message(field: &str, type_name: &str) -> String {
    format!(r#"Unknown field "{field}" on type "{type_name}""#)
}

fn unknown_fragment_message(fragment: &str) -> String {
    format!(r#"Unknown fragment: "{fragment}""#)
}

fn unknown_type_message(type_name: &str) -> String {
    format!(r#"Unknown type "{type_name}""#)
}

fn unknown_directive_message(directive: &str) -> String {
    format!(r#"Unknown directive "{directive}""#)
}

fn misplaced_directive_message(directive: &str, location: DirectiveLocation) -> String {
    format!(r#"Directive "{directive}" may not be used on {location}"#)
}

fn non_composite_message(fragment: Option<&str>, type_name: &str) -> String {
    match fragment {
        Some(name) => {
            format!(r#"Fragment "{name}" cannot condition non composite type "{type_name}""#)
        }
        None => format!(r#"Fragment cannot condition on non composite type "{type_name}""#),
    }
}

fn impossible_spread_message(fragment: Option<&str>, parent: &str, fragment_type: &str) -> String {
    match fragment {
        Some(name) => format!(
            r#"Fragment "{name}" cannot be spread here as objects of type "{parent}" can never be of type "{fragment_type}""#,
        ),
        None => format!(
            r#"Fragment cannot be spread here as objects of type "{parent}" can never be of type "{fragment_type}""#,
        ),
    }
}

fn no_allowed_selection_message(field: &str, type_name: &str) -> String {
    format!(r#"Field "{field}" must not have a selection since type {type_name} has no subfields"#)
}

fn required_selection_message(field: &str, type_name: &str) -> String {
    format!(
        r#"Field "{field}" of type "{type_name}" must have a selection of subfields. Did you mean "{field} {{ ... }}"?"#,
    )
}

#[cfg(test)]
mod tests {
    use super::{
        impossible_spread_message, misplaced_directive_message, missing_root_message,
        no_allowed_selection_message, non_composite_message, required_selection_message,
        unknown_directive_message, unknown_field_message, unknown_fragment_message,
    };
    use crate::{
        ast::{Arguments, Definition, Directive, Field, InputValue, OperationType, Selection},
        definition::DirectiveLocation,
        parser::{SourcePosition, Spanning},
        validation::test_harness::{expect_fails, expect_passes, query},
    };

    #[test]
    fn reports_unknown_fields() {
        let at = SourcePosition::new(8, 0, 8);
        expect_fails(
            &query(vec![Field::new("films", SourcePosition::new_origin())
                .selection_set(vec![Field::new("budget", at).into_selection()])
                .into_selection()]),
            &[(&unknown_field_message("budget", "Film"), &[at])],
        );
    }

    #[test]
    fn typename_is_selectable_everywhere() {
        let at = SourcePosition::new_origin();
        expect_passes(&query(vec![
            Field::new("__typename", at).into_selection(),
            Field::new("films", at)
                .selection_set(vec![Field::new("__typename", at).into_selection()])
                .into_selection(),
        ]));
    }

    #[test]
    fn checks_selection_shape_of_leaves_and_composites() {
        let leaf = SourcePosition::new(10, 1, 4);
        let composite = SourcePosition::new(30, 2, 4);
        expect_fails(
            &query(vec![Field::new("films", SourcePosition::new_origin())
                .selection_set(vec![
                    Field::new("title", leaf)
                        .selection_set(vec![Field::new("length", leaf).into_selection()])
                        .into_selection(),
                    Field::new("director", composite).into_selection(),
                ])
                .into_selection()]),
            &[
                (&no_allowed_selection_message("title", "String!"), &[leaf]),
                (&required_selection_message("director", "Director!"), &[composite]),
            ],
        );
    }

    #[test]
    fn reports_unknown_and_impossible_fragments() {
        let unknown = SourcePosition::new(4, 0, 4);
        let impossible = SourcePosition::new(20, 1, 4);
        expect_fails(
            &[
                Definition::query(vec![Field::new("films", SourcePosition::new_origin())
                    .selection_set(vec![
                        Selection::spread("Missing", unknown),
                        Selection::spread("DirectorFields", impossible),
                    ])
                    .into_selection()]),
                Definition::fragment(
                    "DirectorFields",
                    "Director",
                    vec![Field::new("name", SourcePosition::new_origin()).into_selection()],
                ),
            ],
            &[
                (&unknown_fragment_message("Missing"), &[unknown]),
                (&impossible_spread_message(Some("DirectorFields"), "Film", "Director"), &[impossible]),
            ],
        );
    }

    #[test]
    fn fragments_must_condition_composite_types() {
        let at = SourcePosition::new_origin();
        expect_fails(
            &query(vec![Field::new("films", at)
                .selection_set(vec![Selection::inline(
                    Some("String"),
                    vec![Field::new("title", at).into_selection()],
                    at,
                )])
                .into_selection()]),
            &[(&non_composite_message(None, "String"), &[at])],
        );
    }

    #[test]
    fn interface_fragments_spread_into_implementations() {
        let at = SourcePosition::new_origin();
        expect_passes(&query(vec![Field::new("credits", at)
            .selection_set(vec![Selection::inline(
                Some("Director"),
                vec![Field::new("name", at).into_selection()],
                at,
            )])
            .into_selection()]));
    }

    #[test]
    fn checks_directive_names_and_locations() {
        let at = SourcePosition::new_origin();
        let mut document = query(vec![Field::new("films", at)
            .directive(Directive::new("cached", None))
            .selection_set(vec![Field::new("title", at).into_selection()])
            .into_selection()]);
        if let Some(Definition::Operation(op)) = document.first_mut() {
            let skip = Directive::new(
                "skip",
                Some(Arguments::default().with("if", InputValue::Boolean(false))),
            );
            op.item.directives = Some(vec![Spanning::unlocated(skip)]);
        }

        expect_fails(
            &document,
            &[
                (&unknown_directive_message("cached"), &[at]),
                (&misplaced_directive_message("skip", DirectiveLocation::Query), &[at]),
            ],
        );
    }

    #[test]
    fn operations_need_a_root() {
        expect_fails(
            &[Definition::operation(
                OperationType::Subscription,
                vec![Field::new("films", SourcePosition::new_origin()).into_selection()],
            )],
            &[(&missing_root_message(OperationType::Subscription), &[SourcePosition::new_origin()])],
        );
    }
}
