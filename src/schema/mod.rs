//! Compilation of a [`SchemaDefinition`] into a [`SchemaModel`].
//!
//! [`SchemaDefinition`]: crate::definition::SchemaDefinition
//! [`SchemaModel`]: model::SchemaModel

pub(crate) mod compiler;
pub mod meta;
pub mod model;
pub(crate) mod proxy;
pub mod relations;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;
use serde::Deserialize;

use crate::host::HostTypeId;

/// Error aborting the compilation of a schema.
///
/// Every variant describes a configuration mistake: none of them is
/// recoverable, and no partially compiled schema is ever returned alongside.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum SchemaError {
    /// The request context was used in an output position.
    #[display("{type_name} type cannot be part of schema")]
    ContextInOutput {
        /// Simple name of the offending host type.
        type_name: ArcStr,
    },

    /// A shape refers to a host type missing from the definition's arena.
    #[display("Host type {id} is not declared in this schema definition")]
    UnknownHostType {
        /// Identifier of the missing host type.
        id: HostTypeId,
    },

    /// A type variable could not be resolved against its usage context.
    #[display("Cannot resolve type variable {variable} in {shape}")]
    UnresolvedTypeVariable {
        /// Name of the type variable.
        variable: ArcStr,
        /// Shape the variable was found in.
        shape: String,
    },

    /// An operation was constructed generically without an explicit return
    /// shape.
    #[display(
        "Operation '{operation}' is constructed generically, its return type must be \
         specified explicitly with `returns()`"
    )]
    GenericOperation {
        /// Name of the operation.
        operation: ArcStr,
    },

    /// An object or interface type ended up with no fields.
    #[display("An Object type must define one or more fields. Found none on type {name}")]
    EmptyObject {
        /// Name of the type.
        name: ArcStr,
    },

    /// A declared name starts with the prefix reserved for introspection.
    #[display(
        "Illegal name '{name}'. Names starting with '{prefix}' are reserved for introspection \
         system"
    )]
    ReservedName {
        /// Offending name.
        name: ArcStr,
        /// Reserved prefix.
        prefix: ArcStr,
    },

    /// A union has members which are not object types.
    #[display("Invalid union type members of {union}: [{}]", members.iter().format(", "))]
    InvalidUnionMembers {
        /// Name of the union.
        union: ArcStr,
        /// Names of the invalid members.
        members: Vec<ArcStr>,
    },

    /// Declared input values do not match any parameter of the resolver.
    #[display("Invalid input values on {operation}: [{}]", names.iter().format(", "))]
    InvalidInputValues {
        /// Name of the operation, property or directive.
        operation: String,
        /// Names of the unmatched input values.
        names: Vec<ArcStr>,
    },

    /// A host type that cannot be exposed as an object was used as one.
    #[display("Cannot handle {what} {name} as Object type")]
    InvalidObjectType {
        /// Kind of the host type, e.g. `enum class`.
        what: &'static str,
        /// Qualified name of the host type.
        name: ArcStr,
    },

    /// A collection shape does not specify its element type.
    #[display("Cannot handle collection without element type: {shape}")]
    UntypedCollection {
        /// Offending shape.
        shape: String,
    },

    /// Two distinct types share a name.
    #[display("Type name {name} is used by more than one type")]
    DuplicateTypeName {
        /// Shared name.
        name: ArcStr,
    },

    /// A type was still a placeholder when the schema was assembled.
    #[display("Type {name} is still a placeholder type")]
    IncompleteType {
        /// Name of the type.
        name: ArcStr,
    },

    /// A type was completed more than once.
    #[display("Type {name} is already complete")]
    ProxyAlreadyComplete {
        /// Name of the type.
        name: ArcStr,
    },
}

/// Settings of a schema compilation.
///
/// Every field is optional when deserializing, missing ones take their
/// default value.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct SchemaConfiguration {
    /// Name of the query root type.
    pub query_type_name: String,
    /// Name of the mutation root type.
    pub mutation_type_name: String,
    /// Name of the subscription root type.
    pub subscription_type_name: String,
    /// Prefix of the names reserved for introspection.
    pub reserved_prefix: String,
}

impl Default for SchemaConfiguration {
    fn default() -> Self {
        Self {
            query_type_name: "Query".into(),
            mutation_type_name: "Mutation".into(),
            subscription_type_name: "Subscription".into(),
            reserved_prefix: "__".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use arcstr::ArcStr;

    use super::{SchemaConfiguration, SchemaError};

    #[test]
    fn missing_settings_take_defaults() {
        let configuration: SchemaConfiguration =
            serde_json::from_str(r#"{"query_type_name": "Root"}"#).expect("valid configuration");

        assert_eq!(configuration.query_type_name, "Root");
        assert_eq!(configuration.mutation_type_name, "Mutation");
        assert_eq!(configuration.reserved_prefix, "__");
    }

    #[test]
    fn lists_offending_names() {
        let error = SchemaError::InvalidInputValues {
            operation: "film".into(),
            names: vec![ArcStr::from("rank"), ArcStr::from("title")],
        };

        assert_eq!(error.to_string(), "Invalid input values on film: [rank, title]");
    }
}
