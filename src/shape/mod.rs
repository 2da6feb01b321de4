//! Shapes of host types as they are written in declarations.
//!
//! A [`Shape`] is the generic, possibly nullable type expression attached to a
//! member, a resolver parameter or a return value, e.g. `List<Edge<T, K>>?`.
//! Shapes are kept in canonical form, so structurally equal shapes compare
//! equal regardless of how they were built.

pub mod resolve;

use std::fmt;

use arcstr::ArcStr;
use itertools::Itertools as _;

use crate::host::{HostTypeId, HostTypes};

pub use self::resolve::{generic_supertype, resolve, resolve_type_variable};

/// Entity declaring a [`TypeVariable`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GenericDeclaration {
    /// Declared by a host type, e.g. `T` in `Connection<T>`.
    Type(HostTypeId),
    /// Declared by a function, e.g. `T` in `fn load<T>() -> T`.
    Function(ArcStr),
}

/// Type variable, identified by its declaration and its name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TypeVariable {
    /// Declaration introducing this variable.
    pub declared_by: GenericDeclaration,
    /// Name of this variable.
    pub name: ArcStr,
}

impl TypeVariable {
    /// Creates a new type variable.
    pub fn new(declared_by: GenericDeclaration, name: impl Into<ArcStr>) -> Self {
        Self {
            declared_by,
            name: name.into(),
        }
    }
}

/// Generic type expression.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Shape {
    /// Plain host type without type arguments, e.g. `String`.
    Raw(HostTypeId),

    /// Host type applied to type arguments, e.g. `Map<String, Int>`.
    ///
    /// `owner` is the enclosing parameterized type of a nested generic type.
    Parameterized {
        /// Enclosing type, if any.
        owner: Option<Box<Shape>>,
        /// Generic host type being applied.
        raw: HostTypeId,
        /// Type arguments, in parameter order.
        args: Vec<Shape>,
    },

    /// Array of the component shape.
    Array(Box<Shape>),

    /// Unknown type bounded from above and optionally from below.
    ///
    /// Whenever `lower` is set, `upper` is [`HostTypes::ANY`].
    Wildcard {
        /// Upper bound.
        upper: Box<Shape>,
        /// Lower bound, if any.
        lower: Option<Box<Shape>>,
    },

    /// Type variable.
    Variable(TypeVariable),

    /// Nullable version of the inner shape, which is never `Nullable` itself.
    Nullable(Box<Shape>),
}

impl Shape {
    /// Shape of a plain host type.
    pub fn raw(id: HostTypeId) -> Self {
        Self::Raw(id)
    }

    /// Applies a generic host type to type arguments.
    pub fn parameterized(raw: HostTypeId, args: Vec<Shape>) -> Self {
        Self::nested(None, raw, args)
    }

    /// Applies a generic host type nested into `owner` to type arguments.
    pub fn nested(owner: Option<Shape>, raw: HostTypeId, args: Vec<Shape>) -> Self {
        if owner.is_none() && args.is_empty() {
            return Self::Raw(raw);
        }
        Self::Parameterized {
            owner: owner.map(|o| Box::new(o.canonicalize())),
            raw,
            args: args.into_iter().map(Self::canonicalize).collect(),
        }
    }

    /// Shorthand for `List<element>`.
    pub fn list_of(element: Shape) -> Self {
        Self::parameterized(HostTypes::LIST, vec![element])
    }

    /// Array of `component`.
    pub fn array(component: Shape) -> Self {
        Self::Array(Box::new(component.canonicalize()))
    }

    /// Unknown type extending `bound`, e.g. `? extends Number`.
    pub fn subtype_of(bound: Shape) -> Self {
        match bound.canonicalize() {
            w @ Self::Wildcard { .. } => w,
            bound => Self::Wildcard {
                upper: Box::new(bound),
                lower: None,
            },
        }
    }

    /// Unknown supertype of `bound`, e.g. `? super Int`.
    pub fn supertype_of(bound: Shape) -> Self {
        let lower = match bound.canonicalize() {
            Self::Wildcard { lower, .. } => lower,
            bound => Some(Box::new(bound)),
        };
        Self::Wildcard {
            upper: Box::new(Self::Raw(HostTypes::ANY)),
            lower,
        }
    }

    /// Type variable declared by a host type.
    pub fn variable(declared_by: HostTypeId, name: impl Into<ArcStr>) -> Self {
        Self::Variable(TypeVariable::new(GenericDeclaration::Type(declared_by), name))
    }

    /// Type variable declared by a function.
    pub fn function_variable(function: impl Into<ArcStr>, name: impl Into<ArcStr>) -> Self {
        Self::Variable(TypeVariable::new(
            GenericDeclaration::Function(function.into()),
            name,
        ))
    }

    /// Nullable version of this shape.
    #[must_use]
    pub fn nullable(self) -> Self {
        match self {
            n @ Self::Nullable(_) => n,
            s => Self::Nullable(Box::new(s.canonicalize())),
        }
    }

    /// Rebuilds this shape in canonical form.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        match self {
            Self::Raw(_) | Self::Variable(_) => self,
            Self::Parameterized { owner, raw, args } => {
                Self::nested(owner.map(|o| *o), raw, args)
            }
            Self::Array(component) => Self::array(*component),
            Self::Wildcard { upper, lower } => match lower {
                Some(lower) => Self::supertype_of(*lower),
                None => Self::subtype_of(*upper),
            },
            Self::Nullable(inner) => inner.canonicalize().nullable(),
        }
    }

    /// Returns the raw host type this shape erases to.
    ///
    /// Type variables erase to [`HostTypes::ANY`], wildcards to their upper
    /// bound and arrays to [`HostTypes::ARRAY`].
    pub fn raw_type(&self) -> HostTypeId {
        match self {
            Self::Raw(id) | Self::Parameterized { raw: id, .. } => *id,
            Self::Array(_) => HostTypes::ARRAY,
            Self::Wildcard { upper, .. } => upper.raw_type(),
            Self::Variable(_) => HostTypes::ANY,
            Self::Nullable(inner) => inner.raw_type(),
        }
    }

    /// Whether this shape admits `null`.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// This shape with its top-level nullability stripped.
    pub fn non_null(&self) -> &Self {
        match self {
            Self::Nullable(inner) => inner,
            s => s,
        }
    }

    /// Whether this shape mentions any type variable.
    pub fn has_type_variables(&self) -> bool {
        self.first_type_variable().is_some()
    }

    /// First type variable mentioned by this shape, in depth-first order.
    pub fn first_type_variable(&self) -> Option<&TypeVariable> {
        match self {
            Self::Raw(_) => None,
            Self::Variable(v) => Some(v),
            Self::Parameterized { owner, args, .. } => owner
                .as_deref()
                .and_then(Self::first_type_variable)
                .or_else(|| args.iter().find_map(Self::first_type_variable)),
            Self::Array(inner) | Self::Nullable(inner) => inner.first_type_variable(),
            Self::Wildcard { upper, lower } => lower
                .as_deref()
                .and_then(Self::first_type_variable)
                .or_else(|| upper.first_type_variable()),
        }
    }

    /// Whether this shape needs generic resolution before it can be exposed.
    pub fn is_generic(&self) -> bool {
        match self.non_null() {
            Self::Parameterized { .. } | Self::Variable(_) | Self::Wildcard { .. } => true,
            Self::Array(component) => component.is_generic(),
            Self::Raw(_) | Self::Nullable(_) => false,
        }
    }

    /// Displays this shape with fully qualified host type names.
    pub fn display<'a>(&'a self, hosts: &'a HostTypes) -> ShapeDisplay<'a> {
        ShapeDisplay {
            shape: self,
            hosts,
            qualified: true,
        }
    }

    /// Displays this shape with namespace qualifiers stripped from every host
    /// type name, e.g. `Connection<Person<String>, Int>`.
    pub fn display_simple<'a>(&'a self, hosts: &'a HostTypes) -> ShapeDisplay<'a> {
        ShapeDisplay {
            shape: self,
            hosts,
            qualified: false,
        }
    }
}

impl From<HostTypeId> for Shape {
    fn from(id: HostTypeId) -> Self {
        Self::Raw(id)
    }
}

/// [`fmt::Display`] adapter of a [`Shape`], created by [`Shape::display()`]
/// and [`Shape::display_simple()`].
pub struct ShapeDisplay<'a> {
    shape: &'a Shape,
    hosts: &'a HostTypes,
    qualified: bool,
}

impl ShapeDisplay<'_> {
    fn nested<'b>(&'b self, shape: &'b Shape) -> ShapeDisplay<'b> {
        ShapeDisplay {
            shape,
            hosts: self.hosts,
            qualified: self.qualified,
        }
    }

    fn host_name(&self, id: HostTypeId) -> &str {
        match self.hosts.get(id) {
            Some(host) if self.qualified => &host.qualified_name,
            Some(host) => host.simple_name(),
            None => "<unknown>",
        }
    }
}

impl fmt::Display for ShapeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Raw(id) => f.write_str(self.host_name(*id)),
            Shape::Parameterized { owner, raw, args } => {
                if let (Some(owner), true) = (owner, self.qualified) {
                    write!(f, "{}.", self.nested(owner))?;
                    f.write_str(self.hosts.simple_name(*raw))?;
                } else {
                    f.write_str(self.host_name(*raw))?;
                }
                if !args.is_empty() {
                    let args = args.iter().map(|a| self.nested(a)).format(", ");
                    write!(f, "<{args}>")?;
                }
                Ok(())
            }
            Shape::Array(component) => write!(f, "{}[]", self.nested(component)),
            Shape::Wildcard {
                lower: Some(lower), ..
            } => write!(f, "? super {}", self.nested(lower)),
            Shape::Wildcard { upper, lower: None } => {
                if upper.as_ref() == &Shape::Raw(HostTypes::ANY) {
                    f.write_str("?")
                } else {
                    write!(f, "? extends {}", self.nested(upper))
                }
            }
            Shape::Variable(v) => f.write_str(&v.name),
            Shape::Nullable(inner) => write!(f, "{}?", self.nested(inner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Shape;
    use crate::host::{HostType, HostTypes};

    #[test]
    fn structurally_equal_shapes_compare_equal() {
        let built = Shape::parameterized(HostTypes::LIST, vec![Shape::raw(HostTypes::INT)]);
        let literal = Shape::Parameterized {
            owner: None,
            raw: HostTypes::LIST,
            args: vec![Shape::Raw(HostTypes::INT)],
        };

        assert_eq!(built, literal.canonicalize());
        assert_eq!(
            Shape::parameterized(HostTypes::STRING, vec![]),
            Shape::raw(HostTypes::STRING),
        );
    }

    #[test]
    fn nullability_never_nests() {
        let twice = Shape::raw(HostTypes::INT).nullable().nullable();
        let literal = Shape::Nullable(Box::new(Shape::Nullable(Box::new(Shape::Raw(
            HostTypes::INT,
        )))));

        assert_eq!(twice, Shape::Nullable(Box::new(Shape::Raw(HostTypes::INT))));
        assert_eq!(literal.canonicalize(), twice);
        assert!(twice.is_nullable());
        assert_eq!(twice.non_null(), &Shape::raw(HostTypes::INT));
    }

    #[test]
    fn wildcards_are_canonical() {
        let lower = Shape::supertype_of(Shape::raw(HostTypes::INT));
        let upper = Shape::subtype_of(Shape::subtype_of(Shape::raw(HostTypes::INT)));

        assert_eq!(
            lower,
            Shape::Wildcard {
                upper: Box::new(Shape::Raw(HostTypes::ANY)),
                lower: Some(Box::new(Shape::Raw(HostTypes::INT))),
            },
        );
        assert_eq!(upper, Shape::subtype_of(Shape::raw(HostTypes::INT)));
        assert_eq!(upper.raw_type(), HostTypes::INT);
        assert_eq!(lower.raw_type(), HostTypes::ANY);
    }

    #[test]
    fn displays_with_and_without_qualifiers() {
        let mut hosts = HostTypes::new();
        let connection = hosts.declare(
            HostType::class("demo.Connection")
                .type_param("T")
                .type_param("K"),
        );
        let shape = Shape::parameterized(
            connection,
            vec![
                Shape::raw(HostTypes::STRING),
                Shape::subtype_of(Shape::raw(HostTypes::INT)).nullable(),
            ],
        );

        assert_eq!(
            shape.display(&hosts).to_string(),
            "demo.Connection<std.String, ? extends std.Int?>",
        );
        assert_eq!(
            shape.display_simple(&hosts).to_string(),
            "Connection<String, ? extends Int?>",
        );
        assert_eq!(
            Shape::array(Shape::variable(connection, "T"))
                .display_simple(&hosts)
                .to_string(),
            "T[]",
        );
    }

    #[test]
    fn finds_type_variables() {
        let mut hosts = HostTypes::new();
        let page = hosts.declare(HostType::class("demo.Page").type_param("T"));
        let shape = Shape::list_of(Shape::array(Shape::variable(page, "T")).nullable());

        assert!(shape.has_type_variables());
        assert_eq!(shape.first_type_variable().map(|v| v.name.as_str()), Some("T"));
        assert!(!Shape::list_of(Shape::raw(HostTypes::INT)).has_type_variables());
        assert!(shape.is_generic());
        assert!(!Shape::raw(page).nullable().is_generic());
    }
}
