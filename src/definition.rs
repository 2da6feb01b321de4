//! Declarative schema definition, as produced by a registration DSL.
//!
//! A [`SchemaDefinition`] owns the [`HostTypes`] arena its descriptors refer
//! to, and lists the operations and type descriptors to compile. Resolvers are
//! never invoked here: a [`Resolver`] only records the signature of a user
//! function along with an opaque handle for the execution engine.

use std::{any::Any, sync::Arc};

use arcstr::ArcStr;
use derive_more::with_trait::Debug;

use crate::{
    ast::InputValue,
    host::{HostTypeId, HostTypes},
    schema::meta::{DeprecationStatus, EnumValue},
    shape::Shape,
};

/// Parameter of a [`Resolver`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    /// Name of the parameter, as exposed to requests.
    pub name: ArcStr,
    /// Declared shape of the parameter.
    pub shape: Shape,
}

/// Signature of a user function, along with an opaque handle to it.
///
/// Two resolvers are equal when their signatures are equal and they share the
/// same handle.
#[derive(Clone, Debug)]
pub struct Resolver {
    params: Vec<Parameter>,
    receiver: Option<Shape>,
    return_shape: Option<Shape>,
    is_async: bool,
    #[debug(skip)]
    handle: Arc<dyn Any + Send + Sync>,
}

impl Resolver {
    /// Creates a resolver without parameters around the given `handle`.
    ///
    /// The handle is whatever the execution engine needs to invoke the
    /// function later on, e.g. a boxed closure.
    pub fn new(handle: impl Any + Send + Sync) -> Self {
        Self {
            params: Vec::new(),
            receiver: None,
            return_shape: None,
            is_async: false,
            handle: Arc::new(handle),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<ArcStr>, shape: Shape) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            shape,
        });
        self
    }

    /// Sets the shape of the value the function is called on, which is not
    /// exposed as an argument.
    #[must_use]
    pub fn receiver(mut self, shape: Shape) -> Self {
        self.receiver = Some(shape);
        self
    }

    /// Sets the declared return shape.
    ///
    /// Functions constructed generically have none, or one mentioning their
    /// own type variables.
    #[must_use]
    pub fn returns(mut self, shape: Shape) -> Self {
        self.return_shape = Some(shape);
        self
    }

    /// Marks the function as suspending.
    #[must_use]
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Parameters exposed as arguments, in declaration order.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Shape of the value the function is called on, if any.
    pub fn receiver_shape(&self) -> Option<&Shape> {
        self.receiver.as_ref()
    }

    /// Declared return shape, if any.
    pub fn return_shape(&self) -> Option<&Shape> {
        self.return_shape.as_ref()
    }

    /// Whether the function suspends.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Opaque handle of the function.
    pub fn handle(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.handle
    }

    /// Downcasts the handle of the function.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref()
    }

    fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

impl PartialEq for Resolver {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.receiver == other.receiver
            && self.return_shape == other.return_shape
            && self.is_async == other.is_async
            && Arc::ptr_eq(&self.handle, &other.handle)
    }
}

/// Declared metadata of a resolver parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct InputValueDef {
    /// Name of the resolver parameter this value describes.
    pub name: ArcStr,
    /// Shape replacing the declared one of the parameter.
    pub shape: Option<Shape>,
    /// Value used when a request omits the argument.
    pub default_value: Option<InputValue>,
    /// Description of the argument.
    pub description: Option<ArcStr>,
    /// Deprecation status of the argument.
    pub deprecation: DeprecationStatus,
}

impl InputValueDef {
    /// Describes the parameter called `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            shape: None,
            default_value: None,
            description: None,
            deprecation: DeprecationStatus::Current,
        }
    }

    /// Overrides the declared shape of the parameter.
    #[must_use]
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: InputValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the argument as deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<ArcStr>) -> Self {
        self.deprecation = DeprecationStatus::Deprecated(reason);
        self
    }
}

/// Operation or computed property: a named resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationDef {
    /// Name of the field.
    pub name: ArcStr,
    /// Description of the field.
    pub description: Option<ArcStr>,
    /// Deprecation status of the field.
    pub deprecation: DeprecationStatus,
    /// Function computing the field.
    pub resolver: Resolver,
    /// Metadata of the resolver parameters.
    pub input_values: Vec<InputValueDef>,
    /// Return shape replacing the one declared by the resolver.
    pub returns: Option<Shape>,
}

impl OperationDef {
    /// Creates an operation named `name` computed by `resolver`.
    pub fn new(name: impl Into<ArcStr>, resolver: Resolver) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation: DeprecationStatus::Current,
            resolver,
            input_values: Vec::new(),
            returns: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field as deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<ArcStr>) -> Self {
        self.deprecation = DeprecationStatus::Deprecated(reason);
        self
    }

    /// Describes one of the resolver parameters.
    #[must_use]
    pub fn input_value(mut self, input_value: InputValueDef) -> Self {
        self.input_values.push(input_value);
        self
    }

    /// Declares the return shape explicitly.
    ///
    /// Required for resolvers constructed generically.
    #[must_use]
    pub fn returns(mut self, shape: Shape) -> Self {
        self.returns = Some(shape);
        self
    }

    /// Names of declared input values not matching any resolver parameter.
    pub(crate) fn unknown_input_values(resolver: &Resolver, input_values: &[InputValueDef]) -> Vec<ArcStr> {
        input_values
            .iter()
            .filter(|iv| !resolver.has_param(&iv.name))
            .map(|iv| iv.name.clone())
            .collect()
    }
}

/// Metadata override of a host type member.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PropertyDef {
    /// Name of the host member.
    pub name: ArcStr,
    /// Description of the field.
    pub description: Option<ArcStr>,
    /// Deprecation status of the field.
    pub deprecation: DeprecationStatus,
}

impl PropertyDef {
    /// Overrides the metadata of the member called `name`.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field as deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<ArcStr>) -> Self {
        self.deprecation = DeprecationStatus::Deprecated(reason);
        self
    }
}

/// Function transforming the value of a host member, exposing its
/// parameters as arguments of the member's field.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformationDef {
    /// Name of the host member.
    pub property: ArcStr,
    /// Transforming function, receiving the member value.
    pub resolver: Resolver,
}

/// Field resolving to one of the members of a union.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionPropertyDef {
    /// Name of the field.
    pub name: ArcStr,
    /// Description of the field.
    pub description: Option<ArcStr>,
    /// Deprecation status of the field.
    pub deprecation: DeprecationStatus,
    /// Whether the field may resolve to `null`.
    pub nullable: bool,
    /// Union the field resolves to.
    pub union: UnionDef,
    /// Function computing the field.
    pub resolver: Resolver,
    /// Metadata of the resolver parameters.
    pub input_values: Vec<InputValueDef>,
}

impl UnionPropertyDef {
    /// Creates a non-null field named `name` resolving to `union`.
    pub fn new(name: impl Into<ArcStr>, union: UnionDef, resolver: Resolver) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation: DeprecationStatus::Current,
            nullable: false,
            union,
            resolver,
            input_values: Vec::new(),
        }
    }

    /// Lets the field resolve to `null`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Describes one of the resolver parameters.
    #[must_use]
    pub fn input_value(mut self, input_value: InputValueDef) -> Self {
        self.input_values.push(input_value);
        self
    }
}

/// Field resolved in two phases: a key is prepared per parent value, then all
/// keys of a request are loaded at once.
#[derive(Clone, Debug, PartialEq)]
pub struct DataLoadedPropertyDef {
    /// Name of the field.
    pub name: ArcStr,
    /// Description of the field.
    pub description: Option<ArcStr>,
    /// Deprecation status of the field.
    pub deprecation: DeprecationStatus,
    /// Prepares the key to load, its parameters are the field arguments.
    pub prepare: Resolver,
    /// Loads the values of a batch of keys.
    pub loader: Resolver,
    /// Shape of a loaded value.
    pub returns: Shape,
    /// Metadata of the `prepare` parameters.
    pub input_values: Vec<InputValueDef>,
}

impl DataLoadedPropertyDef {
    /// Creates a field named `name` loading values of shape `returns`.
    pub fn new(name: impl Into<ArcStr>, prepare: Resolver, loader: Resolver, returns: Shape) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecation: DeprecationStatus::Current,
            prepare,
            loader,
            returns,
            input_values: Vec::new(),
        }
    }

    /// Describes one of the `prepare` parameters.
    #[must_use]
    pub fn input_value(mut self, input_value: InputValueDef) -> Self {
        self.input_values.push(input_value);
        self
    }
}

/// Descriptor of an output object type.
///
/// Applies to the described host type and all of its subtypes.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDef {
    /// Described host type.
    pub host: HostTypeId,
    /// Name of the compiled type.
    pub name: ArcStr,
    /// Description of the compiled type.
    pub description: Option<ArcStr>,
    /// Host members not exposed as fields.
    pub ignored: Vec<ArcStr>,
    /// Metadata overrides of host members.
    pub properties: Vec<PropertyDef>,
    /// Transformations of host members.
    pub transformations: Vec<TransformationDef>,
    /// Computed fields.
    pub extension_properties: Vec<OperationDef>,
    /// Union-valued fields.
    pub union_properties: Vec<UnionPropertyDef>,
    /// Batched loader fields.
    pub dataloaded_properties: Vec<DataLoadedPropertyDef>,
}

impl ObjectDef {
    /// Describes `host` under the given `name`.
    pub fn new(host: HostTypeId, name: impl Into<ArcStr>) -> Self {
        Self {
            host,
            name: name.into(),
            description: None,
            ignored: Vec::new(),
            properties: Vec::new(),
            transformations: Vec::new(),
            extension_properties: Vec::new(),
            union_properties: Vec::new(),
            dataloaded_properties: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Hides the host member called `name`.
    #[must_use]
    pub fn ignore(mut self, name: impl Into<ArcStr>) -> Self {
        self.ignored.push(name.into());
        self
    }

    /// Overrides the metadata of a host member.
    #[must_use]
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Transforms the value of the host member called `property`.
    #[must_use]
    pub fn transformation(mut self, property: impl Into<ArcStr>, resolver: Resolver) -> Self {
        self.transformations.push(TransformationDef {
            property: property.into(),
            resolver,
        });
        self
    }

    /// Adds a computed field.
    #[must_use]
    pub fn extension(mut self, property: OperationDef) -> Self {
        self.extension_properties.push(property);
        self
    }

    /// Adds a union-valued field.
    #[must_use]
    pub fn union_property(mut self, property: UnionPropertyDef) -> Self {
        self.union_properties.push(property);
        self
    }

    /// Adds a batched loader field.
    #[must_use]
    pub fn dataloaded(mut self, property: DataLoadedPropertyDef) -> Self {
        self.dataloaded_properties.push(property);
        self
    }

    /// Whether the host member called `name` is hidden.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|i| i == name)
    }
}

/// Descriptor of an input object type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputObjectDef {
    /// Described host type.
    pub host: HostTypeId,
    /// Name of the compiled type.
    pub name: ArcStr,
    /// Description of the compiled type.
    pub description: Option<ArcStr>,
}

impl InputObjectDef {
    /// Describes `host` under the given `name`.
    pub fn new(host: HostTypeId, name: impl Into<ArcStr>) -> Self {
        Self {
            host,
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Descriptor of a union type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnionDef {
    /// Name of the compiled type.
    pub name: ArcStr,
    /// Host types of the members, each has to compile to an object type.
    pub members: Vec<HostTypeId>,
    /// Description of the compiled type.
    pub description: Option<ArcStr>,
    /// Host type this union stands in for wherever it is referenced.
    pub claims: Option<HostTypeId>,
}

impl UnionDef {
    /// Creates a union named `name` over `members`.
    pub fn new(name: impl Into<ArcStr>, members: Vec<HostTypeId>) -> Self {
        Self {
            name: name.into(),
            members,
            description: None,
            claims: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Makes this union stand in for `host` wherever it is referenced.
    #[must_use]
    pub fn claims(mut self, host: HostTypeId) -> Self {
        self.claims = Some(host);
        self
    }
}

/// Descriptor of an enum type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumDef {
    /// Described host type.
    pub host: HostTypeId,
    /// Name of the compiled type.
    pub name: ArcStr,
    /// Description of the compiled type.
    pub description: Option<ArcStr>,
    /// Values of the enum.
    pub values: Vec<EnumValue>,
}

impl EnumDef {
    /// Describes `host` under the given `name`.
    pub fn new(host: HostTypeId, name: impl Into<ArcStr>, values: Vec<EnumValue>) -> Self {
        Self {
            host,
            name: name.into(),
            description: None,
            values,
        }
    }
}

/// Descriptor of a scalar type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScalarDef {
    /// Described host type.
    pub host: HostTypeId,
    /// Name of the compiled type.
    pub name: ArcStr,
    /// Description of the compiled type.
    pub description: Option<ArcStr>,
}

impl ScalarDef {
    /// Describes `host` under the given `name`.
    pub fn new(host: HostTypeId, name: impl Into<ArcStr>) -> Self {
        Self {
            host,
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Location a directive may be used at.
#[derive(Clone, Copy, Debug, derive_more::Display, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum DirectiveLocation {
    #[display("query")]
    Query,
    #[display("mutation")]
    Mutation,
    #[display("subscription")]
    Subscription,
    #[display("field")]
    Field,
    #[display("fragment definition")]
    FragmentDefinition,
    #[display("fragment spread")]
    FragmentSpread,
    #[display("inline fragment")]
    InlineFragment,
}

/// Handle of the built-in directives, for the execution engine to recognize.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuiltinDirective {
    /// `@skip(if: Boolean!)`
    Skip,
    /// `@include(if: Boolean!)`
    Include,
}

/// Descriptor of a directive.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveDef {
    /// Name of the directive.
    pub name: ArcStr,
    /// Description of the directive.
    pub description: Option<ArcStr>,
    /// Locations the directive may be used at.
    pub locations: Vec<DirectiveLocation>,
    /// Function executing the directive, its parameters are the directive
    /// arguments.
    pub execution: Resolver,
}

impl DirectiveDef {
    /// Creates a directive named `name`.
    pub fn new(name: impl Into<ArcStr>, locations: Vec<DirectiveLocation>, execution: Resolver) -> Self {
        Self {
            name: name.into(),
            description: None,
            locations,
            execution,
        }
    }

    fn builtin(name: &str, directive: BuiltinDirective) -> Self {
        let execution = Resolver::new(directive).param("if", Shape::raw(HostTypes::BOOLEAN));
        Self::new(
            name,
            vec![
                DirectiveLocation::Field,
                DirectiveLocation::FragmentSpread,
                DirectiveLocation::InlineFragment,
            ],
            execution,
        )
    }
}

/// Everything the schema is compiled from.
#[derive(Clone, Debug)]
pub struct SchemaDefinition {
    hosts: HostTypes,
    pub(crate) objects: Vec<ObjectDef>,
    pub(crate) input_objects: Vec<InputObjectDef>,
    pub(crate) unions: Vec<UnionDef>,
    pub(crate) enums: Vec<EnumDef>,
    pub(crate) scalars: Vec<ScalarDef>,
    pub(crate) directives: Vec<DirectiveDef>,
    pub(crate) queries: Vec<OperationDef>,
    pub(crate) mutations: Vec<OperationDef>,
    pub(crate) subscriptions: Vec<OperationDef>,
}

impl SchemaDefinition {
    /// Creates a definition over `hosts`, holding the built-in scalars and
    /// directives only.
    pub fn new(hosts: HostTypes) -> Self {
        let scalars = [
            (HostTypes::STRING, "String"),
            (HostTypes::INT, "Int"),
            (HostTypes::LONG, "Long"),
            (HostTypes::SHORT, "Short"),
            (HostTypes::FLOAT, "Float"),
            (HostTypes::DOUBLE, "Double"),
            (HostTypes::BOOLEAN, "Boolean"),
        ]
        .into_iter()
        .map(|(host, name)| ScalarDef::new(host, name))
        .collect();

        Self {
            hosts,
            objects: Vec::new(),
            input_objects: Vec::new(),
            unions: Vec::new(),
            enums: Vec::new(),
            scalars,
            directives: vec![
                DirectiveDef::builtin("skip", BuiltinDirective::Skip),
                DirectiveDef::builtin("include", BuiltinDirective::Include),
            ],
            queries: Vec::new(),
            mutations: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Host types the descriptors refer to.
    pub fn hosts(&self) -> &HostTypes {
        &self.hosts
    }

    /// Adds a query operation.
    #[must_use]
    pub fn query(mut self, operation: OperationDef) -> Self {
        self.queries.push(operation);
        self
    }

    /// Adds a mutation operation.
    #[must_use]
    pub fn mutation(mut self, operation: OperationDef) -> Self {
        self.mutations.push(operation);
        self
    }

    /// Adds a subscription operation.
    #[must_use]
    pub fn subscription(mut self, operation: OperationDef) -> Self {
        self.subscriptions.push(operation);
        self
    }

    /// Adds an object descriptor.
    #[must_use]
    pub fn object(mut self, object: ObjectDef) -> Self {
        self.objects.push(object);
        self
    }

    /// Adds an input object descriptor.
    #[must_use]
    pub fn input_object(mut self, input_object: InputObjectDef) -> Self {
        self.input_objects.push(input_object);
        self
    }

    /// Adds a union descriptor.
    #[must_use]
    pub fn union(mut self, union: UnionDef) -> Self {
        self.unions.push(union);
        self
    }

    /// Adds an enum descriptor.
    #[must_use]
    pub fn enumeration(mut self, enumeration: EnumDef) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Adds a scalar descriptor, replacing the one of the same host type.
    #[must_use]
    pub fn scalar(mut self, scalar: ScalarDef) -> Self {
        self.scalars.retain(|s| s.host != scalar.host);
        self.scalars.push(scalar);
        self
    }

    /// Adds a directive descriptor.
    #[must_use]
    pub fn directive(mut self, directive: DirectiveDef) -> Self {
        self.directives.push(directive);
        self
    }
}
