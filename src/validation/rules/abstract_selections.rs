//! Selections on fields returning a union or an interface.
//!
//! Such selections may only consist of fragments and `__typename`: every
//! other field has to be selected through a fragment on a concrete type.

use std::fmt;

use itertools::Itertools as _;

use crate::{
    ast::{self, Selection},
    parser::Spanning,
    schema::meta::{Field, MetaType, TypeKind},
    validation::ValidatorContext,
};

pub(crate) fn validate(ctx: &mut ValidatorContext<'_>, field: &Field, node: &Spanning<ast::Field<'_>>) {
    let schema = ctx.schema;
    let Some(field_type) = schema.type_by_id(field.field_type.innermost()) else {
        return;
    };
    let Some(selections) = node.item.selection_set.as_deref() else {
        return;
    };
    if !field_type.is_abstract() {
        return;
    }

    let illegal = plain_fields(selections);
    if illegal.is_empty() {
        return;
    }

    ctx.report_error(
        &error_message(
            illegal.iter().map(|f| f.item.alias_or_name().item),
            field_type,
            &field.name,
            schema.possible_types(field_type).into_iter().map(MetaType::name),
        ),
        &illegal.iter().map(|f| f.span.start).collect::<Vec<_>>(),
    );
}

/// Field selections other than `__typename`, including those nested in
/// inline fragments without a type condition.
pub(crate) fn plain_fields<'s, 'a>(
    selections: &'s [Selection<'a>],
) -> Vec<&'s Spanning<ast::Field<'a>>> {
    let mut found = Vec::new();
    collect_plain_fields(selections, &mut found);
    found
}

fn collect_plain_fields<'s, 'a>(
    selections: &'s [Selection<'a>],
    found: &mut Vec<&'s Spanning<ast::Field<'a>>>,
) {
    for selection in selections {
        match selection {
            Selection::Field(f) if f.item.name.item != "__typename" => found.push(f),
            Selection::InlineFragment(inline) if inline.item.type_condition.is_none() => {
                collect_plain_fields(&inline.item.selection_set, found);
            }
            _ => {}
        }
    }
}

fn error_message(
    selected: impl Iterator<Item = impl fmt::Display>,
    field_type: &MetaType,
    field_name: &str,
    possible_types: impl Iterator<Item = impl fmt::Display>,
) -> String {
    let kind = match field_type.type_kind() {
        TypeKind::Interface => "interface",
        _ => "union",
    };
    format!(
        "Invalid selection set with properties: [{}] on {kind} type property {field_name} : [{}]",
        selected.format(", "),
        possible_types.format(", "),
    )
}
