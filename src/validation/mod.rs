//! Query validation related methods and data structures

mod context;
mod rules;
mod walk;

#[cfg(test)]
mod test_harness;

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

use crate::{
    ast::{self, Document},
    parser::Spanning,
    schema::{
        meta::{Field, MetaType},
        model::SchemaModel,
    },
};

pub use self::context::{RuleError, ValidatorContext};

/// Every violation found in one request.
///
/// Never empty: a request without violations validates successfully.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("{}", errors.iter().format("\n"))]
pub struct ValidationError {
    errors: Vec<RuleError>,
}

impl ValidationError {
    /// Violations, sorted by their source positions.
    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }

    /// Consumes this error, returning its violations.
    pub fn into_errors(self) -> Vec<RuleError> {
        self.errors
    }
}

/// Checks the arguments and the immediate selections of a single field
/// selected on `parent`.
///
/// Every violation is collected, the first one found never stops the
/// validation.
pub fn validate_field(
    schema: &SchemaModel,
    parent: &MetaType,
    field: &Field,
    node: &Spanning<ast::Field<'_>>,
) -> Result<(), ValidationError> {
    let mut ctx = ValidatorContext::new(schema, &[]);
    rules::arguments::validate_field(&mut ctx, parent, field, node);
    rules::abstract_selections::validate(&mut ctx, field, node);
    finish(ctx)
}

/// Validates a whole request document against the compiled schema.
pub fn validate_document<'a>(
    schema: &'a SchemaModel,
    document: &'a Document<'a>,
) -> Result<(), ValidationError> {
    __typegraph_span_trace!("validate_document");

    let mut ctx = ValidatorContext::new(schema, document);
    walk::visit_document(&mut ctx, document);
    finish(ctx)
}

fn finish(ctx: ValidatorContext<'_>) -> Result<(), ValidationError> {
    if !ctx.has_errors() {
        return Ok(());
    }
    let errors = ctx.into_errors();
    __typegraph_debug!(violations = errors.len(), "request failed validation");
    Err(ValidationError { errors })
}
