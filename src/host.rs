//! Host type universe.
//!
//! Host types are the data structures the schema is bound to. Since there is
//! no runtime reflection to lean on, they are described explicitly: every host
//! type lives in a [`HostTypes`] arena and is addressed by a [`HostTypeId`].
//! The descriptor carries what the compiler needs to know about it: its kind,
//! its type parameters, its generic supertypes and its members.

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use arcstr::ArcStr;
use fnv::FnvHashSet;

use crate::shape::{GenericDeclaration, Shape, TypeVariable};

/// Identifier of a [`HostType`] inside its [`HostTypes`] arena.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HostTypeId(u32);

impl HostTypeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for HostTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a host type, deciding how it may be exposed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HostKind {
    /// Closed type, cannot be extended.
    Final,
    /// Open type that other types may extend.
    Open,
    /// Abstract type that other types may extend.
    Abstract,
    /// Interface type.
    Interface,
    /// Closed hierarchy with a finite set of variants.
    Sealed,
    /// Enumeration.
    Enum,
    /// Function type.
    Function,
}

impl HostKind {
    /// Whether no other host type may extend this one.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Final | Self::Enum)
    }
}

/// Visibility of a [`Member`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Visibility {
    /// Visible to everyone, exposed as a field.
    #[default]
    Public,
    /// Visible within the declaring module only.
    Internal,
    /// Visible to subtypes only.
    Protected,
    /// Visible to the declaring type only.
    Private,
}

/// Data member of a host type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    /// Name of the member.
    pub name: ArcStr,
    /// Declared shape, including its nullability.
    pub shape: Shape,
    /// Visibility of the member.
    pub visibility: Visibility,
}

impl Member {
    /// Creates a new public member.
    pub fn new(name: impl Into<ArcStr>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            visibility: Visibility::Public,
        }
    }

    /// Sets the visibility of this member.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Descriptor of a single host type.
#[derive(Clone, Debug)]
pub struct HostType {
    /// Fully qualified name, with `.` separating namespaces and enclosing
    /// types, e.g. `demo.Connection.Edge`.
    pub qualified_name: ArcStr,
    /// Kind of the type.
    pub kind: HostKind,
    /// Names of the declared type parameters, in order.
    pub type_params: Vec<ArcStr>,
    /// Generic superclass, if any.
    pub superclass: Option<Shape>,
    /// Generic implemented interfaces, in declaration order.
    pub interfaces: Vec<Shape>,
    /// Declared data members, in declaration order.
    pub members: Vec<Member>,
    /// Whether the members of this type are hidden from the schema.
    pub not_introspected: bool,
}

impl HostType {
    /// Creates a new host type descriptor of the given `kind`.
    pub fn new(qualified_name: impl Into<ArcStr>, kind: HostKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            not_introspected: false,
        }
    }

    /// Creates a new [`HostKind::Final`] host type.
    pub fn class(qualified_name: impl Into<ArcStr>) -> Self {
        Self::new(qualified_name, HostKind::Final)
    }

    /// Creates a new [`HostKind::Open`] host type.
    pub fn open_class(qualified_name: impl Into<ArcStr>) -> Self {
        Self::new(qualified_name, HostKind::Open)
    }

    /// Creates a new [`HostKind::Interface`] host type.
    pub fn interface(qualified_name: impl Into<ArcStr>) -> Self {
        Self::new(qualified_name, HostKind::Interface)
    }

    /// Creates a new [`HostKind::Sealed`] host type.
    pub fn sealed(qualified_name: impl Into<ArcStr>) -> Self {
        Self::new(qualified_name, HostKind::Sealed)
    }

    /// Creates a new [`HostKind::Enum`] host type.
    pub fn enumeration(qualified_name: impl Into<ArcStr>) -> Self {
        Self::new(qualified_name, HostKind::Enum)
    }

    /// Declares a type parameter.
    #[must_use]
    pub fn type_param(mut self, name: impl Into<ArcStr>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Sets the generic superclass.
    #[must_use]
    pub fn extends(mut self, superclass: Shape) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Adds a generic implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: Shape) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a public data member.
    #[must_use]
    pub fn property(mut self, name: impl Into<ArcStr>, shape: Shape) -> Self {
        self.members.push(Member::new(name, shape));
        self
    }

    /// Adds a data member.
    #[must_use]
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Hides the members of this type from the schema.
    #[must_use]
    pub fn not_introspected(mut self) -> Self {
        self.not_introspected = true;
        self
    }

    /// Adds a data member to an already declared type.
    ///
    /// Needed to describe types referencing each other.
    pub fn push_member(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Name of this type with namespaces and enclosing types stripped.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Whether this type is an interface.
    pub fn is_interface(&self) -> bool {
        self.kind == HostKind::Interface
    }
}

/// Arena of all host types known to a schema definition.
///
/// A fresh arena already contains the built-in host types, available through
/// the associated constants.
#[derive(Clone, Debug)]
pub struct HostTypes {
    types: Vec<HostType>,
}

impl HostTypes {
    /// Root of every host type hierarchy.
    pub const ANY: HostTypeId = HostTypeId(0);
    /// Built-in string type.
    pub const STRING: HostTypeId = HostTypeId(1);
    /// Built-in 32-bit integer type.
    pub const INT: HostTypeId = HostTypeId(2);
    /// Built-in 64-bit integer type.
    pub const LONG: HostTypeId = HostTypeId(3);
    /// Built-in 16-bit integer type.
    pub const SHORT: HostTypeId = HostTypeId(4);
    /// Built-in single precision float type.
    pub const FLOAT: HostTypeId = HostTypeId(5);
    /// Built-in double precision float type.
    pub const DOUBLE: HostTypeId = HostTypeId(6);
    /// Built-in boolean type.
    pub const BOOLEAN: HostTypeId = HostTypeId(7);
    /// `Iterable<T>`, supertype of every collection.
    pub const ITERABLE: HostTypeId = HostTypeId(8);
    /// `Collection<E>: Iterable<E>`.
    pub const COLLECTION: HostTypeId = HostTypeId(9);
    /// `List<E>: Collection<E>`.
    pub const LIST: HostTypeId = HostTypeId(10);
    /// `Set<E>: Collection<E>`.
    pub const SET: HostTypeId = HostTypeId(11);
    /// `Array<T>`, raw type of every array shape.
    pub const ARRAY: HostTypeId = HostTypeId(12);
    /// Request-context carrier type.
    pub const CONTEXT: HostTypeId = HostTypeId(13);
    /// Execution-node carrier type.
    pub const EXECUTION_NODE: HostTypeId = HostTypeId(14);
    /// Root of all function types.
    pub const FUNCTION: HostTypeId = HostTypeId(15);

    /// Creates an arena holding the built-in host types only.
    pub fn new() -> Self {
        let element = |decl: HostTypeId, name: &str| {
            Shape::Variable(TypeVariable::new(GenericDeclaration::Type(decl), name))
        };

        let types = vec![
            HostType::open_class("std.Any"),
            HostType::class("std.String"),
            HostType::class("std.Int"),
            HostType::class("std.Long"),
            HostType::class("std.Short"),
            HostType::class("std.Float"),
            HostType::class("std.Double"),
            HostType::class("std.Boolean"),
            HostType::interface("std.collections.Iterable").type_param("T"),
            HostType::interface("std.collections.Collection")
                .type_param("E")
                .implements(Shape::parameterized(
                    Self::ITERABLE,
                    vec![element(Self::COLLECTION, "E")],
                )),
            HostType::interface("std.collections.List")
                .type_param("E")
                .implements(Shape::parameterized(
                    Self::COLLECTION,
                    vec![element(Self::LIST, "E")],
                )),
            HostType::interface("std.collections.Set")
                .type_param("E")
                .implements(Shape::parameterized(
                    Self::COLLECTION,
                    vec![element(Self::SET, "E")],
                )),
            HostType::class("std.Array").type_param("T"),
            HostType::class("typegraph.Context"),
            HostType::class("typegraph.ExecutionNode"),
            HostType::new("std.Function", HostKind::Function),
        ];

        Self { types }
    }

    /// Declares a new host type, returning its identifier.
    pub fn declare(&mut self, host_type: HostType) -> HostTypeId {
        let id = HostTypeId(
            u32::try_from(self.types.len()).unwrap_or_else(|_| panic!("too many host types")),
        );
        self.types.push(host_type);
        id
    }

    /// Looks up a host type.
    pub fn get(&self, id: HostTypeId) -> Option<&HostType> {
        self.types.get(id.index())
    }

    /// Iterates over all declared host types, built-ins included.
    pub fn iter(&self) -> impl Iterator<Item = (HostTypeId, &HostType)> {
        (0u32..)
            .map(HostTypeId)
            .zip(self.types.iter())
    }

    /// Simple name of a host type, or `<unknown>` if it isn't declared in
    /// this arena.
    pub fn simple_name(&self, id: HostTypeId) -> &str {
        self.get(id).map_or("<unknown>", HostType::simple_name)
    }

    /// Returns `true` if `sub` is `sup` or (transitively) extends or
    /// implements it.
    ///
    /// Every host type is a subtype of [`HostTypes::ANY`].
    pub fn is_subtype_of(&self, sub: HostTypeId, sup: HostTypeId) -> bool {
        if sub == sup || sup == Self::ANY {
            return true;
        }
        let mut visited = FnvHashSet::default();
        self.search_supertypes(sub, sup, &mut visited)
    }

    /// Same as [`HostTypes::is_subtype_of()`], excluding identity.
    pub fn is_strict_subtype_of(&self, sub: HostTypeId, sup: HostTypeId) -> bool {
        sub != sup && self.is_subtype_of(sub, sup)
    }

    fn search_supertypes(
        &self,
        current: HostTypeId,
        target: HostTypeId,
        visited: &mut FnvHashSet<HostTypeId>,
    ) -> bool {
        if !visited.insert(current) {
            return false;
        }
        let Some(host) = self.get(current) else {
            return false;
        };
        Self::direct_supertypes(host).any(|raw| {
            raw == target || self.search_supertypes(raw, target, visited)
        })
    }

    fn direct_supertypes(host: &HostType) -> impl Iterator<Item = HostTypeId> + '_ {
        host.superclass
            .iter()
            .chain(host.interfaces.iter())
            .map(Shape::raw_type)
    }

    /// Variants of a sealed host type: the host types directly extending or
    /// implementing it, in declaration order.
    pub fn sealed_variants(&self, sealed: HostTypeId) -> Vec<HostTypeId> {
        self.iter()
            .filter(|(_, host)| Self::direct_supertypes(host).any(|raw| raw == sealed))
            .map(|(id, _)| id)
            .collect()
    }

    /// Members exposed by a host type: its own members in declaration order,
    /// followed by inherited members not shadowed by name.
    ///
    /// Inherited members keep their declared shapes, so type variables in them
    /// refer to the declaring supertype.
    pub fn exposed_members(&self, id: HostTypeId) -> Vec<&Member> {
        let mut members: Vec<&Member> = Vec::new();
        let mut visited = FnvHashSet::default();
        self.collect_members(id, &mut members, &mut visited);
        members
    }

    fn collect_members<'a>(
        &'a self,
        id: HostTypeId,
        members: &mut Vec<&'a Member>,
        visited: &mut FnvHashSet<HostTypeId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(host) = self.get(id) else {
            return;
        };
        for member in &host.members {
            if !members.iter().any(|m| m.name == member.name) {
                members.push(member);
            }
        }
        for raw in Self::direct_supertypes(host) {
            self.collect_members(raw, members, visited);
        }
    }
}

impl Default for HostTypes {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// If the [`HostTypeId`] was issued by another arena.
impl Index<HostTypeId> for HostTypes {
    type Output = HostType;

    fn index(&self, id: HostTypeId) -> &Self::Output {
        &self.types[id.index()]
    }
}

impl IndexMut<HostTypeId> for HostTypes {
    fn index_mut(&mut self, id: HostTypeId) -> &mut Self::Output {
        &mut self.types[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::{HostType, HostTypes, Member, Visibility};
    use crate::shape::Shape;

    #[test]
    fn builtins_are_addressable() {
        let hosts = HostTypes::new();

        assert_eq!(hosts.simple_name(HostTypes::STRING), "String");
        assert_eq!(hosts.simple_name(HostTypes::LIST), "List");
        assert_eq!(hosts.simple_name(HostTypes::CONTEXT), "Context");
        assert!(hosts[HostTypes::ITERABLE].is_interface());
    }

    #[test]
    fn subtyping_follows_superclasses_and_interfaces() {
        let mut hosts = HostTypes::new();
        let named = hosts.declare(HostType::interface("demo.Named"));
        let animal = hosts.declare(
            HostType::open_class("demo.Animal").implements(Shape::raw(named)),
        );
        let dog = hosts.declare(HostType::class("demo.Dog").extends(Shape::raw(animal)));
        let rock = hosts.declare(HostType::class("demo.Rock"));

        assert!(hosts.is_subtype_of(dog, named));
        assert!(hosts.is_strict_subtype_of(dog, animal));
        assert!(!hosts.is_strict_subtype_of(dog, dog));
        assert!(hosts.is_subtype_of(dog, dog));
        assert!(!hosts.is_subtype_of(rock, named));
        assert!(hosts.is_subtype_of(rock, HostTypes::ANY));
        assert!(hosts.is_subtype_of(HostTypes::LIST, HostTypes::ITERABLE));
    }

    #[test]
    fn sealed_variants_are_direct_subtypes() {
        let mut hosts = HostTypes::new();
        let shape = hosts.declare(HostType::sealed("demo.Shape"));
        let circle = hosts.declare(HostType::class("demo.Shape.Circle").extends(Shape::raw(shape)));
        let square = hosts.declare(HostType::class("demo.Shape.Square").extends(Shape::raw(shape)));
        hosts.declare(HostType::class("demo.Line"));

        assert_eq!(hosts.sealed_variants(shape), vec![circle, square]);
        assert_eq!(hosts.simple_name(circle), "Circle");
    }

    #[test]
    fn exposed_members_include_unshadowed_inherited_ones() {
        let mut hosts = HostTypes::new();
        let base = hosts.declare(
            HostType::open_class("demo.Base")
                .property("id", Shape::raw(HostTypes::STRING))
                .property("name", Shape::raw(HostTypes::STRING)),
        );
        let derived = hosts.declare(
            HostType::class("demo.Derived")
                .extends(Shape::raw(base))
                .property("name", Shape::raw(HostTypes::STRING).nullable())
                .member(
                    Member::new("secret", Shape::raw(HostTypes::STRING))
                        .visibility(Visibility::Private),
                ),
        );

        let names = hosts
            .exposed_members(derived)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names, ["name", "secret", "id"]);
        assert!(hosts.exposed_members(derived)[0].shape.is_nullable());
    }
}
