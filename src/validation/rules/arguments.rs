//! Arguments of fields and directives against their declared inputs.
//!
//! Inputs whose type is internal (the request context or the execution node)
//! are invisible to requests: they can neither be passed nor be missing.

use itertools::Itertools as _;

use crate::{
    ast::{self, Arguments},
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{Argument, Field, MetaType},
        model::DirectiveType,
    },
    validation::ValidatorContext,
};

/// Selection the arguments are passed to.
#[derive(Clone, Copy, Debug)]
enum Owner<'a> {
    Field { name: &'a str, parent: &'a str },
    Directive { name: &'a str },
}

pub(crate) fn validate_field(
    ctx: &mut ValidatorContext<'_>,
    parent: &MetaType,
    field: &Field,
    node: &Spanning<ast::Field<'_>>,
) {
    check(
        ctx,
        Owner::Field {
            name: &field.name,
            parent: parent.name(),
        },
        &field.arguments,
        node.item.arguments.as_ref(),
        node.span.start,
    );
}

pub(crate) fn validate_directive(
    ctx: &mut ValidatorContext<'_>,
    directive: &DirectiveType,
    node: &Spanning<ast::Directive<'_>>,
) {
    check(
        ctx,
        Owner::Directive {
            name: &directive.name,
        },
        &directive.arguments,
        node.item.arguments.as_ref(),
        node.span.start,
    );
}

fn check(
    ctx: &mut ValidatorContext<'_>,
    owner: Owner<'_>,
    declared: &[Argument],
    requested: Option<&Spanning<Arguments<'_>>>,
    at: SourcePosition,
) {
    let schema = ctx.schema;
    let visible = declared
        .iter()
        .filter(|arg| {
            !schema
                .type_by_id(arg.arg_type.innermost())
                .is_some_and(MetaType::is_internal)
        })
        .collect::<Vec<_>>();
    let requested = requested.map(|args| args.item.items.as_slice()).unwrap_or_default();

    if visible.is_empty() {
        if !requested.is_empty() {
            let locations = requested.iter().map(|(name, _)| name.span.start).collect::<Vec<_>>();
            ctx.report_error(&no_arguments_message(owner, requested), &locations);
        }
        return;
    }

    let unknown = requested
        .iter()
        .filter(|(name, _)| !visible.iter().any(|arg| arg.name == name.item))
        .map(|(name, _)| name.span.start)
        .collect::<Vec<_>>();
    if !unknown.is_empty() {
        ctx.report_error(&unknown_arguments_message(owner, &visible, requested), &unknown);
    }

    for arg in visible {
        if arg.is_required() && !requested.iter().any(|(name, _)| arg.name == name.item) {
            ctx.report_error(&missing_argument_message(owner, &arg.name), &[at]);
        }
    }
}

fn found(requested: &[(Spanning<&str>, Spanning<ast::InputValue>)]) -> String {
    requested.iter().map(|(name, _)| name.item).join(", ")
}

fn no_arguments_message(
    owner: Owner<'_>,
    requested: &[(Spanning<&str>, Spanning<ast::InputValue>)],
) -> String {
    match owner {
        Owner::Field { name, parent } => format!(
            "Property {name} on type {parent} has no arguments, found: [{}]",
            found(requested),
        ),
        Owner::Directive { name } => format!(
            "Directive {name} has no arguments, found: [{}]",
            found(requested),
        ),
    }
}

fn unknown_arguments_message(
    owner: Owner<'_>,
    declared: &[&Argument],
    requested: &[(Spanning<&str>, Spanning<ast::InputValue>)],
) -> String {
    let name = match owner {
        Owner::Field { name, .. } | Owner::Directive { name } => name,
    };
    format!(
        "{name} does support arguments [{}]. Found arguments [{}]",
        declared.iter().map(|arg| &arg.name).join(", "),
        found(requested),
    )
}

fn missing_argument_message(owner: Owner<'_>, arg_name: &str) -> String {
    match owner {
        Owner::Field { name, .. } => {
            format!("Missing value for non-nullable argument {arg_name} on the field '{name}'")
        }
        Owner::Directive { name } => {
            format!("Missing value for non-nullable argument {arg_name} on the directive '@{name}'")
        }
    }
}
