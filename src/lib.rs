#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing;

#[macro_use]
mod macros;
pub mod ast;
pub mod definition;
pub mod host;
pub mod parser;
pub mod schema;
pub mod shape;
pub mod validation;

#[cfg(test)]
mod tests;

use crate::schema::compiler::Compiler;

pub use crate::{
    definition::SchemaDefinition,
    host::{HostType, HostTypeId, HostTypes},
    parser::{SourcePosition, Span, Spanning},
    schema::{
        SchemaConfiguration, SchemaError, meta,
        model::{DirectiveType, SchemaModel},
    },
    shape::Shape,
    validation::{RuleError, ValidationError, validate_document, validate_field},
};

static_assertions::assert_impl_all!(SchemaModel: Send, Sync);

/// Compiles a schema definition with the default [`SchemaConfiguration`].
pub fn compile(definition: &SchemaDefinition) -> Result<SchemaModel, SchemaError> {
    compile_with(&SchemaConfiguration::default(), definition)
}

/// Compiles a schema definition into an immutable [`SchemaModel`].
///
/// Fails on the first configuration mistake found, in which case nothing is
/// compiled at all.
pub fn compile_with(
    configuration: &SchemaConfiguration,
    definition: &SchemaDefinition,
) -> Result<SchemaModel, SchemaError> {
    Compiler::new(configuration, definition).perform()
}
