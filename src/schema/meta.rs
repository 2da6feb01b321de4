//! Types used to describe a compiled schema.

use std::fmt;

use arcstr::ArcStr;
use derive_more::with_trait::Display;

use crate::{ast::InputValue, definition::Resolver, host::HostTypeId};

/// Identifier of a [`MetaType`] inside its [`SchemaModel`].
///
/// [`SchemaModel`]: crate::SchemaModel
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Kind of a type, as exposed by introspection.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TypeKind {
    /// Scalar types appear as the leaf nodes of queries.
    #[display("SCALAR")]
    Scalar,
    /// Object types are the most common type of types.
    #[display("OBJECT")]
    Object,
    /// Interface types are abstract types implemented by object types.
    #[display("INTERFACE")]
    Interface,
    /// Unions are abstract types over a fixed set of object types.
    #[display("UNION")]
    Union,
    /// Enums are leaf values with a closed set of names.
    #[display("ENUM")]
    Enum,
    /// Input objects are complex values provided in queries.
    #[display("INPUT_OBJECT")]
    InputObject,
    /// List wrapper.
    #[display("LIST")]
    List,
    /// Non-null wrapper.
    #[display("NON_NULL")]
    NonNull,
    /// Request-scoped value never observable by clients.
    #[display("INTERNAL")]
    Internal,
}

/// Reference to a compiled type, including its wrappers.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeRef {
    /// Nullable named type, e.g. `String`.
    Named(TypeId),
    /// Nullable list type, e.g. `[String]`.
    List(Box<TypeRef>),
    /// Non-null version of a nullable type, e.g. `String!` or `[String]!`.
    ///
    /// Never wraps another [`TypeRef::NonNull`].
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Wraps this type into a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Non-null version of this type.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            nn @ Self::NonNull(_) => nn,
            t => Self::NonNull(Box::new(t)),
        }
    }

    /// This type with its top-level non-null wrapper removed.
    pub fn nullable(&self) -> &Self {
        match self {
            Self::NonNull(inner) => inner,
            t => t,
        }
    }

    /// Determines if this type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Whether this is a (possibly non-null) list.
    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), Self::List(_))
    }

    /// Named type found by unpacking all wrappers.
    pub fn innermost(&self) -> TypeId {
        match self {
            Self::Named(id) => *id,
            Self::List(inner) | Self::NonNull(inner) => inner.innermost(),
        }
    }

    /// Kind of the outermost wrapper, or `None` for a named type.
    pub fn wrapper_kind(&self) -> Option<TypeKind> {
        match self {
            Self::Named(_) => None,
            Self::List(_) => Some(TypeKind::List),
            Self::NonNull(_) => Some(TypeKind::NonNull),
        }
    }
}

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    #[default]
    Current,
    /// The field/variant is deprecated, with an optional reason.
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::Deprecated(_))
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// Scalar type metadata
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub host: HostTypeId,
}

/// Object type metadata
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    /// Implemented interfaces, populated by the relationship inference only.
    pub interfaces: Vec<TypeId>,
    /// Host type this object was built from, `None` for operation roots.
    pub host: Option<HostTypeId>,
}

/// Interface type metadata
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub fields: Vec<Field>,
    /// Implementing objects, populated by the relationship inference only.
    pub possible_types: Vec<TypeId>,
    #[doc(hidden)]
    pub host: HostTypeId,
}

/// Union type metadata
#[derive(Clone, Debug, PartialEq)]
pub struct UnionMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub of_types: Vec<TypeId>,
    /// Synthetic `__typename` field.
    pub typename: Field,
}

/// Enum type metadata
#[derive(Clone, Debug, PartialEq)]
pub struct EnumMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub values: Vec<EnumValue>,
    #[doc(hidden)]
    pub host: HostTypeId,
}

/// Input object metadata
#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub input_fields: Vec<Argument>,
    #[doc(hidden)]
    pub host: HostTypeId,
}

/// Request-scoped value injected into resolvers, such as the request context.
///
/// Never exposed by the registries or to requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InternalMeta {
    #[doc(hidden)]
    pub name: ArcStr,
}

/// A placeholder for not-yet-completed types
///
/// Inserted before a type's members are compiled, to indicate its existence
/// to the members referencing it back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlaceholderMeta {
    #[doc(hidden)]
    pub name: ArcStr,
    /// Kind the completed type is going to have.
    pub kind: TypeKind,
}

/// Generic type metadata
#[derive(Clone, Debug, PartialEq)]
pub enum MetaType {
    #[doc(hidden)]
    Scalar(ScalarMeta),
    #[doc(hidden)]
    Object(ObjectMeta),
    #[doc(hidden)]
    Interface(InterfaceMeta),
    #[doc(hidden)]
    Union(UnionMeta),
    #[doc(hidden)]
    Enum(EnumMeta),
    #[doc(hidden)]
    InputObject(InputObjectMeta),
    #[doc(hidden)]
    Internal(InternalMeta),
    #[doc(hidden)]
    Placeholder(PlaceholderMeta),
}

/// How the execution engine obtains the value of a [`Field`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// Data member of the host type, optionally passed through a
    /// transformation taking the field arguments.
    Property {
        /// Name of the host member.
        member: ArcStr,
        /// Transformation applied to the member value.
        transformation: Option<Resolver>,
    },
    /// Computed field, e.g. an operation or an extension property.
    Function(Resolver),
    /// Field resolving to one of the members of a union.
    Union {
        /// Resolver producing the value.
        resolver: Resolver,
        /// Union type of the field.
        union: TypeId,
    },
    /// Field resolved in two phases so the loads can be batched per request.
    DataLoader {
        /// Produces the key to load from the parent value and arguments.
        prepare: Resolver,
        /// Loads the values of all collected keys at once.
        loader: Resolver,
    },
    /// Synthetic `__typename` field.
    Typename,
}

/// Metadata for a field
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arguments: Vec<Argument>,
    #[doc(hidden)]
    pub field_type: TypeRef,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
    #[doc(hidden)]
    pub kind: FieldKind,
}

impl Field {
    /// Builds a new [`Field`] of the given [`TypeRef`] with the given `name`.
    pub fn new(name: impl Into<ArcStr>, field_type: TypeRef, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            field_type,
            deprecation_status: DeprecationStatus::Current,
            kind,
        }
    }

    /// Builds the synthetic `__typename` field of the given `String` type.
    pub fn typename(string: TypeId) -> Self {
        Self::new("__typename", TypeRef::Named(string).non_null(), FieldKind::Typename)
    }

    /// Sets the `description` of this [`Field`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Sets the `arguments` of this [`Field`].
    #[must_use]
    pub fn arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Sets the deprecation status of this [`Field`].
    #[must_use]
    pub fn deprecation(mut self, status: DeprecationStatus) -> Self {
        self.deprecation_status = status;
        self
    }

    /// Whether this is the synthetic `__typename` field.
    pub fn is_typename(&self) -> bool {
        matches!(self.kind, FieldKind::Typename)
    }

    /// Access an argument's meta data given its name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// Metadata for an argument to a field, or a field of an input object
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    #[doc(hidden)]
    pub name: ArcStr,
    #[doc(hidden)]
    pub description: Option<ArcStr>,
    #[doc(hidden)]
    pub arg_type: TypeRef,
    #[doc(hidden)]
    pub default_value: Option<InputValue>,
    #[doc(hidden)]
    pub deprecation_status: DeprecationStatus,
}

impl Argument {
    /// Builds a new [`Argument`] of the given [`TypeRef`] with the given `name`.
    pub fn new(name: impl Into<ArcStr>, arg_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            arg_type,
            default_value: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Whether a request must provide a value for this argument.
    pub fn is_required(&self) -> bool {
        self.arg_type.is_non_null() && self.default_value.is_none()
    }
}

/// Metadata for a single value in an enum
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumValue {
    /// The name of the enum value
    pub name: ArcStr,
    /// The optional description of the enum value.
    pub description: Option<ArcStr>,
    /// Whether the value is deprecated or not, with an optional reason.
    pub deprecation_status: DeprecationStatus,
}

impl EnumValue {
    /// Constructs a new [`EnumValue`] with the provided `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
        }
    }

    /// Sets the `description` of this [`EnumValue`].
    ///
    /// Overwrites any previously set description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets this [`EnumValue`] as deprecated with an optional `reason`.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<ArcStr>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason);
        self
    }
}

impl MetaType {
    /// Access the name of the type
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(ScalarMeta { name, .. })
            | Self::Object(ObjectMeta { name, .. })
            | Self::Interface(InterfaceMeta { name, .. })
            | Self::Union(UnionMeta { name, .. })
            | Self::Enum(EnumMeta { name, .. })
            | Self::InputObject(InputObjectMeta { name, .. })
            | Self::Internal(InternalMeta { name })
            | Self::Placeholder(PlaceholderMeta { name, .. }) => name,
        }
    }

    /// Access the description of the type, if applicable
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(ScalarMeta { description, .. })
            | Self::Object(ObjectMeta { description, .. })
            | Self::Interface(InterfaceMeta { description, .. })
            | Self::Union(UnionMeta { description, .. })
            | Self::Enum(EnumMeta { description, .. })
            | Self::InputObject(InputObjectMeta { description, .. }) => description.as_ref(),
            Self::Internal(_) | Self::Placeholder(_) => None,
        }
    }

    /// Kind of this type.
    ///
    /// A placeholder reports the kind of the type it stands in for.
    pub fn type_kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::Enum(_) => TypeKind::Enum,
            Self::InputObject(_) => TypeKind::InputObject,
            Self::Internal(_) => TypeKind::Internal,
            Self::Placeholder(PlaceholderMeta { kind, .. }) => *kind,
        }
    }

    /// Host type this type was built from, if any.
    pub fn host(&self) -> Option<HostTypeId> {
        match self {
            Self::Scalar(ScalarMeta { host, .. })
            | Self::Interface(InterfaceMeta { host, .. })
            | Self::Enum(EnumMeta { host, .. })
            | Self::InputObject(InputObjectMeta { host, .. }) => Some(*host),
            Self::Object(ObjectMeta { host, .. }) => *host,
            Self::Union(_) | Self::Internal(_) | Self::Placeholder(_) => None,
        }
    }

    /// Fields of an object or an interface.
    ///
    /// A union only exposes its `__typename` field.
    pub fn fields(&self) -> &[Field] {
        match self {
            Self::Object(ObjectMeta { fields, .. }) | Self::Interface(InterfaceMeta { fields, .. }) => {
                fields
            }
            Self::Union(UnionMeta { typename, .. }) => std::slice::from_ref(typename),
            _ => &[],
        }
    }

    /// Access a field's meta data given its name
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Access an input field's meta data given its name
    ///
    /// Only input objects have input fields. This method always returns `None` for other types.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match self {
            Self::InputObject(InputObjectMeta { input_fields, .. }) => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Returns true if the type is a composite type
    ///
    /// Objects, interfaces, and unions are composite.
    pub fn is_composite(&self) -> bool {
        matches!(
            self.type_kind(),
            TypeKind::Object | TypeKind::Interface | TypeKind::Union,
        )
    }

    /// Returns true if the type can occur in leaf positions in queries
    ///
    /// Only enums and scalars are leaf types.
    pub fn is_leaf(&self) -> bool {
        matches!(self.type_kind(), TypeKind::Enum | TypeKind::Scalar)
    }

    /// Returns true if the type is abstract
    ///
    /// Only interfaces and unions are abstract types.
    pub fn is_abstract(&self) -> bool {
        matches!(self.type_kind(), TypeKind::Interface | TypeKind::Union)
    }

    /// Returns true if the type can be used in input positions
    pub fn is_input(&self) -> bool {
        matches!(
            self.type_kind(),
            TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject,
        )
    }

    /// Returns true if the type is request-scoped and hidden from clients.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl ScalarMeta {
    /// Builds a new [`ScalarMeta`] type with the specified `name`.
    pub fn new(name: impl Into<ArcStr>, host: HostTypeId) -> Self {
        Self {
            name: name.into(),
            description: None,
            host,
        }
    }

    /// Sets the `description` of this [`ScalarMeta`] type.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Wraps this [`ScalarMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Scalar(self)
    }
}

impl ObjectMeta {
    /// Build a new [`ObjectMeta`] type with the specified `name` and `fields`.
    pub fn new(name: impl Into<ArcStr>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
            interfaces: Vec::new(),
            host: None,
        }
    }

    /// Sets the `description` of this [`ObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Sets the host type this [`ObjectMeta`] type is built from.
    #[must_use]
    pub fn host(mut self, host: HostTypeId) -> Self {
        self.host = Some(host);
        self
    }

    /// Wraps this [`ObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Object(self)
    }
}

impl InterfaceMeta {
    /// Builds a new [`InterfaceMeta`] type with the specified `name` and
    /// `fields`.
    pub fn new(name: impl Into<ArcStr>, host: HostTypeId, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
            possible_types: Vec::new(),
            host,
        }
    }

    /// Sets the `description` of this [`InterfaceMeta`] type.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Wraps this [`InterfaceMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Interface(self)
    }
}

impl UnionMeta {
    /// Build a new [`UnionMeta`] type with the specified `name` and possible
    /// types.
    pub fn new(name: impl Into<ArcStr>, of_types: Vec<TypeId>, typename: Field) -> Self {
        Self {
            name: name.into(),
            description: None,
            of_types,
            typename,
        }
    }

    /// Sets the `description` of this [`UnionMeta`] type.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Wraps this [`UnionMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Union(self)
    }
}

impl EnumMeta {
    /// Build a new [`EnumMeta`] type with the specified `name` and possible
    /// `values`.
    pub fn new(name: impl Into<ArcStr>, host: HostTypeId, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values,
            host,
        }
    }

    /// Sets the `description` of this [`EnumMeta`] type.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Wraps this [`EnumMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::Enum(self)
    }
}

impl InputObjectMeta {
    /// Builds a new [`InputObjectMeta`] type with the specified `name` and
    /// `input_fields`.
    pub fn new(name: impl Into<ArcStr>, host: HostTypeId, input_fields: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_fields,
            host,
        }
    }

    /// Set the `description` of this [`InputObjectMeta`] type.
    #[must_use]
    pub fn description(mut self, description: Option<ArcStr>) -> Self {
        self.description = description;
        self
    }

    /// Wraps this [`InputObjectMeta`] type into a generic [`MetaType`].
    pub fn into_meta(self) -> MetaType {
        MetaType::InputObject(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Argument, TypeId, TypeKind, TypeRef};

    #[test]
    fn non_null_never_nests() {
        let string = TypeRef::Named(TypeId(0));

        let twice = string.clone().non_null().non_null();

        assert_eq!(twice, TypeRef::NonNull(Box::new(string.clone())));
        assert_eq!(twice.nullable(), &string);
        assert_eq!(twice.wrapper_kind(), Some(TypeKind::NonNull));
    }

    #[test]
    fn lists_wrap_independently() {
        let element = TypeRef::Named(TypeId(3)).non_null();
        let list = element.clone().list();

        assert!(!list.is_non_null());
        assert!(list.is_list());
        assert!(list.clone().non_null().is_list());
        assert_eq!(list.innermost(), TypeId(3));
        assert_eq!(list.non_null().nullable(), &TypeRef::List(Box::new(element)));
    }

    #[test]
    fn required_arguments_are_non_null_without_default() {
        let string = TypeRef::Named(TypeId(0));

        assert!(Argument::new("id", string.clone().non_null()).is_required());
        assert!(!Argument::new("id", string.clone()).is_required());

        let mut defaulted = Argument::new("id", string.non_null());
        defaulted.default_value = Some(crate::ast::InputValue::String("x".into()));
        assert!(!defaulted.is_required());
    }
}
