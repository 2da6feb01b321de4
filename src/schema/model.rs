//! Immutable result of a schema compilation.

use std::fmt;

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::{
    definition::{DirectiveLocation, Resolver},
    host::HostTypeId,
    schema::meta::{Argument, InterfaceMeta, MetaType, TypeId, TypeRef, UnionMeta},
};

/// Compiled, fully cross-referenced type graph.
///
/// Types reference each other by [`TypeId`], which indexes into this model.
/// Once compiled, the model is never mutated and may be shared freely between
/// request handlers.
#[derive(Debug, PartialEq)]
pub struct SchemaModel {
    pub(crate) types: Vec<MetaType>,
    pub(crate) query: TypeId,
    pub(crate) mutation: Option<TypeId>,
    pub(crate) subscription: Option<TypeId>,
    pub(crate) query_types: IndexMap<ArcStr, TypeId>,
    pub(crate) input_types: IndexMap<ArcStr, TypeId>,
    pub(crate) all_types: Vec<TypeId>,
    pub(crate) enums: IndexMap<ArcStr, TypeId>,
    pub(crate) scalars: IndexMap<ArcStr, TypeId>,
    pub(crate) unions: IndexMap<ArcStr, TypeId>,
    pub(crate) directives: Vec<DirectiveType>,
    pub(crate) hosts: FnvHashMap<HostTypeId, TypeId>,
}

/// Compiled directive.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveType {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub locations: Vec<DirectiveLocation>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
    /// Function executing the directive.
    pub execution: Resolver,
}

impl SchemaModel {
    /// Looks up a type by its identifier.
    pub fn type_by_id(&self, id: TypeId) -> Option<&MetaType> {
        self.types.get(id.index())
    }

    /// Looks up a type by its name, in any category.
    ///
    /// Output types take precedence over input types of the same name.
    pub fn type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.type_id_by_name(name).and_then(|id| self.type_by_id(id))
    }

    /// Looks up the identifier of a type by its name, in any category.
    ///
    /// Output types take precedence over input types of the same name.
    pub fn type_id_by_name(&self, name: &str) -> Option<TypeId> {
        self.query_types
            .get(name)
            .or_else(|| self.input_types.get(name))
            .copied()
    }

    /// Looks up an input type by its name.
    pub fn input_type_by_name(&self, name: &str) -> Option<&MetaType> {
        self.input_types
            .get(name)
            .and_then(|id| self.type_by_id(*id))
    }

    /// Output type built from a host type, if any.
    pub fn type_for_host(&self, host: HostTypeId) -> Option<&MetaType> {
        self.hosts.get(&host).and_then(|id| self.type_by_id(*id))
    }

    /// Identifier of the query root type.
    pub fn query_type_id(&self) -> TypeId {
        self.query
    }

    /// Query root type.
    pub fn query_type(&self) -> &MetaType {
        &self.types[self.query.index()]
    }

    /// Mutation root type, if any mutation is declared.
    pub fn mutation_type(&self) -> Option<&MetaType> {
        self.mutation.and_then(|id| self.type_by_id(id))
    }

    /// Subscription root type, if any subscription is declared.
    pub fn subscription_type(&self) -> Option<&MetaType> {
        self.subscription.and_then(|id| self.type_by_id(id))
    }

    /// Types allowed in output positions, by name.
    pub fn query_types(&self) -> &IndexMap<ArcStr, TypeId> {
        &self.query_types
    }

    /// Types allowed in input positions, by name.
    pub fn input_types(&self) -> &IndexMap<ArcStr, TypeId> {
        &self.input_types
    }

    /// All types exposed by this schema, output types first.
    ///
    /// A name may occur twice when a host type is used in both positions.
    pub fn all_types(&self) -> &[TypeId] {
        &self.all_types
    }

    /// Enum types, by name.
    pub fn enums(&self) -> &IndexMap<ArcStr, TypeId> {
        &self.enums
    }

    /// Scalar types, by name.
    pub fn scalars(&self) -> &IndexMap<ArcStr, TypeId> {
        &self.scalars
    }

    /// Union types, by name.
    pub fn unions(&self) -> &IndexMap<ArcStr, TypeId> {
        &self.unions
    }

    /// Iterates over all types exposed by this schema.
    pub fn type_list(&self) -> impl Iterator<Item = &MetaType> {
        self.all_types.iter().filter_map(|id| self.type_by_id(*id))
    }

    /// Compiled directives, in declaration order.
    pub fn directive_list(&self) -> &[DirectiveType] {
        &self.directives
    }

    /// Looks up a directive by its name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.iter().find(|d| d.name == name)
    }

    /// Concrete types which may occur in place of an abstract one.
    ///
    /// Always empty for non-abstract types.
    pub fn possible_types(&self, t: &MetaType) -> Vec<&MetaType> {
        let ids = match t {
            MetaType::Union(UnionMeta { of_types, .. }) => of_types.as_slice(),
            MetaType::Interface(InterfaceMeta { possible_types, .. }) => possible_types.as_slice(),
            _ => &[],
        };
        ids.iter().filter_map(|id| self.type_by_id(*id)).collect()
    }

    /// Whether `possible_type` may occur in place of `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &MetaType, possible_type: &MetaType) -> bool {
        self.possible_types(abstract_type)
            .into_iter()
            .any(|t| t.name() == possible_type.name())
    }

    /// Whether a value may be of both types at once.
    pub fn type_overlap(&self, t1: &MetaType, t2: &MetaType) -> bool {
        if t1.name() == t2.name() {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// Displays a type reference the way requests spell it, e.g. `[Int!]!`.
    pub fn display<'a>(&'a self, type_ref: &'a TypeRef) -> TypeRefDisplay<'a> {
        TypeRefDisplay {
            model: self,
            type_ref,
        }
    }
}

/// [`fmt::Display`] adapter of a [`TypeRef`], created by
/// [`SchemaModel::display()`].
pub struct TypeRefDisplay<'a> {
    model: &'a SchemaModel,
    type_ref: &'a TypeRef,
}

impl<'a> TypeRefDisplay<'a> {
    fn nested(&self, type_ref: &'a TypeRef) -> Self {
        Self {
            model: self.model,
            type_ref,
        }
    }
}

impl fmt::Display for TypeRefDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_ref {
            TypeRef::Named(id) => match self.model.type_by_id(*id) {
                Some(t) => f.write_str(t.name()),
                None => write!(f, "{id}"),
            },
            TypeRef::List(inner) => write!(f, "[{}]", self.nested(inner)),
            TypeRef::NonNull(inner) => write!(f, "{}!", self.nested(inner)),
        }
    }
}
