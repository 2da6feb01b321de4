//! Type graph compiler.
//!
//! Walks the operations and descriptors of a [`SchemaDefinition`], turning
//! every host type reachable from them into exactly one [`MetaType`] per
//! category. Output (query) and input positions are cached separately, since
//! the same host type compiles differently in each of them.
//!
//! A type is registered as a placeholder before its members are compiled, so
//! members referencing it back (directly or through other types) resolve to
//! its [`TypeId`] instead of recursing forever.

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::{
    definition::{
        DataLoadedPropertyDef, InputValueDef, ObjectDef, OperationDef, Resolver,
        SchemaDefinition, UnionDef, UnionPropertyDef,
    },
    host::{HostKind, HostTypeId, HostTypes, Visibility},
    schema::{
        SchemaConfiguration, SchemaError,
        meta::{
            Argument, EnumMeta, Field, FieldKind, InputObjectMeta, InterfaceMeta, InternalMeta,
            MetaType, ObjectMeta, ScalarMeta, TypeId, TypeKind, TypeRef, UnionMeta,
        },
        model::{DirectiveType, SchemaModel},
        proxy::TypeProxy,
        relations::{Candidate, Relations},
    },
    shape::{self, Shape},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Category {
    Query,
    Input,
}

/// Concrete shape of the type whose members are being compiled, used to
/// resolve the type variables mentioned by them.
#[derive(Clone, Copy)]
struct Scope<'s> {
    shape: &'s Shape,
    raw: HostTypeId,
}

#[derive(Debug)]
struct UnionEntry {
    id: TypeId,
    name: ArcStr,
    claims: Option<HostTypeId>,
}

/// Single-use compilation state. Consumed by [`Compiler::perform()`].
pub(crate) struct Compiler<'d> {
    configuration: &'d SchemaConfiguration,
    definition: &'d SchemaDefinition,
    hosts: &'d HostTypes,
    reserved_prefix: ArcStr,
    proxies: Vec<TypeProxy>,
    query_types: IndexMap<Shape, TypeId>,
    input_types: IndexMap<Shape, TypeId>,
    enums: IndexMap<HostTypeId, TypeId>,
    scalars: IndexMap<HostTypeId, TypeId>,
    unions: Vec<UnionEntry>,
    context: Option<TypeId>,
    execution: Option<TypeId>,
    string: TypeId,
}

impl<'d> Compiler<'d> {
    pub(crate) fn new(
        configuration: &'d SchemaConfiguration,
        definition: &'d SchemaDefinition,
    ) -> Self {
        let mut compiler = Self {
            configuration,
            definition,
            hosts: definition.hosts(),
            reserved_prefix: configuration.reserved_prefix.as_str().into(),
            proxies: Vec::new(),
            query_types: IndexMap::new(),
            input_types: IndexMap::new(),
            enums: IndexMap::new(),
            scalars: IndexMap::new(),
            unions: Vec::new(),
            context: None,
            execution: None,
            string: TypeId(0),
        };

        for def in &definition.enums {
            let meta = EnumMeta::new(def.name.clone(), def.host, def.values.clone())
                .description(def.description.clone());
            let id = compiler.allocate(TypeProxy::complete(meta.into_meta()));
            compiler.enums.insert(def.host, id);
        }
        for def in &definition.scalars {
            let meta = ScalarMeta::new(def.name.clone(), def.host)
                .description(def.description.clone());
            let id = compiler.allocate(TypeProxy::complete(meta.into_meta()));
            compiler.scalars.insert(def.host, id);
        }
        compiler.string = match compiler.scalars.get(&HostTypes::STRING) {
            Some(id) => *id,
            None => {
                let meta = ScalarMeta::new("String", HostTypes::STRING).into_meta();
                let id = compiler.allocate(TypeProxy::complete(meta));
                compiler.scalars.insert(HostTypes::STRING, id);
                id
            }
        };

        compiler
    }

    /// Compiles the whole definition.
    pub(crate) fn perform(mut self) -> Result<SchemaModel, SchemaError> {
        let definition = self.definition;
        let configuration = self.configuration;

        __typegraph_span_trace!("compile_schema");
        __typegraph_debug!(
            queries = definition.queries.len(),
            mutations = definition.mutations.len(),
            subscriptions = definition.subscriptions.len(),
            "compiling schema"
        );

        for union in &definition.unions {
            self.handle_union(union)?;
        }
        for object in &definition.objects {
            // Generic descriptors only apply to concrete usages.
            if self.hosts.get(object.host).is_none_or(|h| h.type_params.is_empty()) {
                self.handle_object_type(&Shape::raw(object.host))?;
            }
        }
        for input in &definition.input_objects {
            if self.hosts.get(input.host).is_none_or(|h| h.type_params.is_empty()) {
                self.handle_input_type(&Shape::raw(input.host))?;
            }
        }

        let query_name = ArcStr::from(configuration.query_type_name.as_str());
        let query = self
            .handle_root(&query_name, "Query object", &definition.queries)?
            .ok_or(SchemaError::EmptyObject { name: query_name })?;
        let mutation = self.handle_root(
            &configuration.mutation_type_name.as_str().into(),
            "Mutation object",
            &definition.mutations,
        )?;
        let subscription = self.handle_root(
            &configuration.subscription_type_name.as_str().into(),
            "Subscription object",
            &definition.subscriptions,
        )?;

        self.introspect_relations();

        let mut directives = Vec::with_capacity(definition.directives.len());
        for directive in &definition.directives {
            let arguments =
                self.handle_input_values(&directive.name, &directive.execution, &[], None)?;
            directives.push(DirectiveType {
                name: directive.name.clone(),
                description: directive.description.clone(),
                locations: directive.locations.clone(),
                arguments,
                execution: directive.execution.clone(),
            });
        }

        self.into_model(query, mutation, subscription, directives)
    }

    fn allocate(&mut self, proxy: TypeProxy) -> TypeId {
        let id = TypeId(
            u32::try_from(self.proxies.len()).unwrap_or_else(|_| panic!("too many types")),
        );
        self.proxies.push(proxy);
        id
    }

    fn proxy(&self, id: TypeId) -> &TypeProxy {
        &self.proxies[id.index()]
    }

    fn proxy_mut(&mut self, id: TypeId) -> &mut TypeProxy {
        &mut self.proxies[id.index()]
    }

    fn handle_root(
        &mut self,
        name: &ArcStr,
        description: &'static str,
        operations: &[OperationDef],
    ) -> Result<Option<TypeId>, SchemaError> {
        let mut fields = Vec::with_capacity(operations.len() + 1);
        for operation in operations {
            fields.push(self.handle_operation(operation, None)?);
        }
        if fields.is_empty() {
            return Ok(None);
        }
        self.check_reserved_names(&fields)?;
        fields.push(Field::typename(self.string));

        let meta = ObjectMeta::new(name.clone(), fields).description(Some(description.into()));
        __typegraph_debug!(name = %name, "compiled operation root");
        Ok(Some(self.allocate(TypeProxy::complete(meta.into_meta()))))
    }

    /// Compiles a computed field, typed by the return shape of its resolver.
    fn handle_operation(
        &mut self,
        operation: &OperationDef,
        scope: Option<Scope<'_>>,
    ) -> Result<Field, SchemaError> {
        let generic = || SchemaError::GenericOperation {
            operation: operation.name.clone(),
        };

        let declared = operation
            .returns
            .as_ref()
            .or(operation.resolver.return_shape())
            .ok_or_else(generic)?;
        let returns = self.concrete(scope, declared);
        if returns.has_type_variables() {
            return Err(generic());
        }

        let field_type = self.handle_possibly_wrapped(&returns, Category::Query)?;
        let arguments = self.handle_input_values(
            &operation.name,
            &operation.resolver,
            &operation.input_values,
            scope,
        )?;

        Ok(Field::new(
            operation.name.clone(),
            field_type,
            FieldKind::Function(operation.resolver.clone()),
        )
        .description(operation.description.clone())
        .deprecation(operation.deprecation.clone())
        .arguments(arguments))
    }

    fn handle_union_property(
        &mut self,
        property: &UnionPropertyDef,
        scope: Option<Scope<'_>>,
    ) -> Result<Field, SchemaError> {
        let arguments = self.handle_input_values(
            &property.name,
            &property.resolver,
            &property.input_values,
            scope,
        )?;
        let union = self.handle_union(&property.union)?;

        let field_type = if property.nullable {
            TypeRef::Named(union)
        } else {
            TypeRef::Named(union).non_null()
        };
        let kind = FieldKind::Union {
            resolver: property.resolver.clone(),
            union,
        };
        Ok(Field::new(property.name.clone(), field_type, kind)
            .description(property.description.clone())
            .deprecation(property.deprecation.clone())
            .arguments(arguments))
    }

    fn handle_dataloaded_property(
        &mut self,
        property: &DataLoadedPropertyDef,
        scope: Option<Scope<'_>>,
    ) -> Result<Field, SchemaError> {
        let returns = self.concrete(scope, &property.returns);
        let field_type = self.handle_possibly_wrapped(&returns, Category::Query)?;
        let arguments = self.handle_input_values(
            &property.name,
            &property.prepare,
            &property.input_values,
            scope,
        )?;

        let kind = FieldKind::DataLoader {
            prepare: property.prepare.clone(),
            loader: property.loader.clone(),
        };
        Ok(Field::new(property.name.clone(), field_type, kind)
            .description(property.description.clone())
            .deprecation(property.deprecation.clone())
            .arguments(arguments))
    }

    /// Compiles the parameters of `resolver` into arguments, applying the
    /// declared `input_values` metadata.
    fn handle_input_values(
        &mut self,
        operation: &str,
        resolver: &Resolver,
        input_values: &[InputValueDef],
        scope: Option<Scope<'_>>,
    ) -> Result<Vec<Argument>, SchemaError> {
        let unknown = OperationDef::unknown_input_values(resolver, input_values);
        if !unknown.is_empty() {
            return Err(SchemaError::InvalidInputValues {
                operation: operation.into(),
                names: unknown,
            });
        }

        let mut arguments = Vec::with_capacity(resolver.params().len());
        for param in resolver.params() {
            let declared = input_values.iter().find(|iv| iv.name == param.name);
            let shape = declared
                .and_then(|iv| iv.shape.as_ref())
                .unwrap_or(&param.shape);
            let shape = self.concrete(scope, shape);

            let mut argument = Argument::new(
                param.name.clone(),
                self.handle_possibly_wrapped(&shape, Category::Input)?,
            );
            if let Some(declared) = declared {
                argument.description = declared.description.clone();
                argument.default_value = declared.default_value.clone();
                argument.deprecation_status = declared.deprecation.clone();
            }
            arguments.push(argument);
        }
        Ok(arguments)
    }

    /// Resolves the type variables of `shape` against the enclosing `scope`.
    fn concrete(&self, scope: Option<Scope<'_>>, shape: &Shape) -> Shape {
        match scope {
            Some(scope) if shape.has_type_variables() => {
                let resolved = shape::resolve(self.hosts, scope.shape, scope.raw, shape);
                __typegraph_trace!(
                    declared = %shape.display_simple(self.hosts),
                    resolved = %resolved.display_simple(self.hosts),
                    "resolved type variables"
                );
                resolved
            }
            _ => shape.clone(),
        }
    }

    /// Compiles a shape into a type reference, unwrapping collections and
    /// applying the declared nullability at every level.
    fn handle_possibly_wrapped(
        &mut self,
        shape: &Shape,
        category: Category,
    ) -> Result<TypeRef, SchemaError> {
        if let Some(variable) = shape.first_type_variable() {
            return Err(SchemaError::UnresolvedTypeVariable {
                variable: variable.name.clone(),
                shape: shape.display_simple(self.hosts).to_string(),
            });
        }

        let inner = shape.non_null();
        let type_ref = match inner {
            Shape::Wildcard { upper, lower } => {
                let bound = lower.as_deref().unwrap_or(&**upper);
                let bound = self.handle_possibly_wrapped(bound, category)?;
                return Ok(if shape.is_nullable() {
                    bound.nullable().clone()
                } else {
                    bound
                });
            }
            Shape::Array(component) => {
                TypeRef::List(Box::new(self.handle_possibly_wrapped(component, category)?))
            }
            _ if self.hosts.is_subtype_of(inner.raw_type(), HostTypes::ITERABLE) => {
                let element = self.element_shape(inner)?;
                TypeRef::List(Box::new(self.handle_possibly_wrapped(&element, category)?))
            }
            _ => {
                let raw = inner.raw_type();
                if raw == HostTypes::CONTEXT || raw == HostTypes::EXECUTION_NODE {
                    return self.handle_internal(raw, category);
                }
                self.handle_raw(inner, category)?
            }
        };

        Ok(if shape.is_nullable() {
            type_ref
        } else {
            type_ref.non_null()
        })
    }

    /// Element shape of an iterable shape, as seen through `Iterable<T>`.
    fn element_shape(&self, iterable: &Shape) -> Result<Shape, SchemaError> {
        let raw = iterable.raw_type();
        let supertype = shape::generic_supertype(self.hosts, iterable, raw, HostTypes::ITERABLE);
        let element = match shape::resolve(self.hosts, iterable, raw, &supertype) {
            Shape::Parameterized { args, .. } => args.into_iter().next(),
            _ => None,
        };
        match element {
            Some(element) if !element.has_type_variables() => Ok(element),
            _ => Err(SchemaError::UntypedCollection {
                shape: iterable.display_simple(self.hosts).to_string(),
            }),
        }
    }

    /// Request-scoped values may only be injected into resolvers.
    fn handle_internal(
        &mut self,
        raw: HostTypeId,
        category: Category,
    ) -> Result<TypeRef, SchemaError> {
        if category == Category::Query {
            return Err(SchemaError::ContextInOutput {
                type_name: self.hosts.simple_name(raw).into(),
            });
        }

        let slot = if raw == HostTypes::CONTEXT {
            self.context
        } else {
            self.execution
        };
        let id = match slot {
            Some(id) => id,
            None => {
                let name = ArcStr::from(self.hosts.simple_name(raw));
                let id = self.allocate(TypeProxy::complete(MetaType::Internal(InternalMeta {
                    name,
                })));
                if raw == HostTypes::CONTEXT {
                    self.context = Some(id);
                } else {
                    self.execution = Some(id);
                }
                id
            }
        };
        Ok(TypeRef::Named(id))
    }

    fn handle_raw(&mut self, shape: &Shape, category: Category) -> Result<TypeRef, SchemaError> {
        let raw = shape.raw_type();
        if self.hosts.get(raw).is_none() {
            return Err(SchemaError::UnknownHostType { id: raw });
        }

        if category == Category::Query {
            if let Some(union) = self.claimed_union(raw) {
                return Ok(TypeRef::Named(union));
            }
        }

        let cached = match category {
            Category::Query => self.query_types.get(shape),
            Category::Input => self.input_types.get(shape),
        };
        if let Some(id) = cached
            .or_else(|| self.enums.get(&raw))
            .or_else(|| self.scalars.get(&raw))
        {
            return Ok(TypeRef::Named(*id));
        }

        match category {
            Category::Query if self.hosts.get(raw).is_some_and(|h| h.kind == HostKind::Sealed) => {
                let hosts = self.hosts;
                let union = UnionDef::new(hosts.simple_name(raw), hosts.sealed_variants(raw))
                    .claims(raw);
                Ok(TypeRef::Named(self.handle_union(&union)?))
            }
            Category::Query => self.handle_object_type(shape).map(TypeRef::Named),
            Category::Input => self.handle_input_type(shape).map(TypeRef::Named),
        }
    }

    fn claimed_union(&self, raw: HostTypeId) -> Option<TypeId> {
        let simple_name = self.hosts.get(raw).map(|h| h.simple_name());
        self.unions
            .iter()
            .find(|u| u.claims == Some(raw) || Some(u.name.as_str()) == simple_name)
            .map(|u| u.id)
    }

    fn assert_valid_object_type(&self, raw: HostTypeId) -> Result<(), SchemaError> {
        let Some(host) = self.hosts.get(raw) else {
            return Err(SchemaError::UnknownHostType { id: raw });
        };
        let what = match host.kind {
            HostKind::Function => "function",
            _ if self.hosts.is_strict_subtype_of(raw, HostTypes::FUNCTION) => "function",
            HostKind::Enum => "enum class",
            _ => return Ok(()),
        };
        Err(SchemaError::InvalidObjectType {
            what,
            name: host.qualified_name.clone(),
        })
    }

    /// Name of a type built from `shape`: generic usages are named after
    /// their type arguments.
    fn type_name(&self, shape: &Shape, declared: Option<&ArcStr>) -> ArcStr {
        match (shape, declared) {
            (Shape::Parameterized { .. }, _) => shape.display_simple(self.hosts).to_string().into(),
            (_, Some(name)) => name.clone(),
            (_, None) => self.hosts.simple_name(shape.raw_type()).into(),
        }
    }

    fn handle_object_type(&mut self, shape: &Shape) -> Result<TypeId, SchemaError> {
        if let Some(id) = self.query_types.get(shape) {
            return Ok(*id);
        }

        let raw = shape.raw_type();
        self.assert_valid_object_type(raw)?;

        let (hosts, definition) = (self.hosts, self.definition);
        let descriptors = definition
            .objects
            .iter()
            .filter(|d| hosts.is_subtype_of(raw, d.host))
            .collect::<Vec<_>>();
        let own = descriptors.iter().rev().find(|d| d.host == raw);
        let name = self.type_name(shape, own.map(|d| &d.name));
        let description = own.and_then(|d| d.description.clone());

        // Introspection types are objects regardless of their host kind.
        let is_final = hosts.get(raw).is_some_and(|h| h.kind.is_final());
        let kind = if is_final || name.starts_with(self.reserved_prefix.as_str()) {
            TypeKind::Object
        } else {
            TypeKind::Interface
        };

        __typegraph_span_trace!("handle_object_type");
        __typegraph_debug!(name = %name, kind = %kind, "constructing output type");

        let id = self.allocate(TypeProxy::placeholder(name.clone(), kind));
        self.query_types.insert(shape.clone(), id);

        let scope = Scope { shape, raw };
        let mut fields = self.handle_members(&descriptors, scope)?;
        for descriptor in &descriptors {
            for property in &descriptor.extension_properties {
                fields.push(self.handle_operation(property, Some(scope))?);
            }
        }
        for descriptor in &descriptors {
            for property in &descriptor.union_properties {
                fields.push(self.handle_union_property(property, Some(scope))?);
            }
        }
        for descriptor in &descriptors {
            for property in &descriptor.dataloaded_properties {
                fields.push(self.handle_dataloaded_property(property, Some(scope))?);
            }
        }

        if fields.is_empty() {
            return Err(SchemaError::EmptyObject { name });
        }
        self.check_reserved_names(&fields)?;
        fields.push(Field::typename(self.string));

        let meta = match kind {
            TypeKind::Object => ObjectMeta::new(name, fields)
                .description(description)
                .host(raw)
                .into_meta(),
            _ => InterfaceMeta::new(name, raw, fields)
                .description(description)
                .into_meta(),
        };
        self.proxy_mut(id).fill(meta)?;
        Ok(id)
    }

    /// Compiles the visible data members of the host type of `scope`.
    fn handle_members(
        &mut self,
        descriptors: &[&'d ObjectDef],
        scope: Scope<'_>,
    ) -> Result<Vec<Field>, SchemaError> {
        let hosts = self.hosts;
        let mut fields = Vec::new();
        for member in hosts.exposed_members(scope.raw) {
            if member.visibility != Visibility::Public
                || descriptors.iter().any(|d| d.is_ignored(&member.name))
            {
                continue;
            }

            // Overrides registered later win.
            let property = descriptors
                .iter()
                .flat_map(|d| &d.properties)
                .filter(|p| p.name == member.name)
                .last();
            let transformation = descriptors
                .iter()
                .flat_map(|d| &d.transformations)
                .filter(|t| t.property == member.name)
                .last();

            let shape = self.concrete(Some(scope), &member.shape);
            let field_type = self.handle_possibly_wrapped(&shape, Category::Query)?;
            let arguments = match transformation {
                Some(t) => self.handle_input_values(
                    &format!("{} transformation", member.name),
                    &t.resolver,
                    &[],
                    Some(scope),
                )?,
                None => Vec::new(),
            };

            let kind = FieldKind::Property {
                member: member.name.clone(),
                transformation: transformation.map(|t| t.resolver.clone()),
            };
            fields.push(
                Field::new(member.name.clone(), field_type, kind)
                    .description(property.and_then(|p| p.description.clone()))
                    .deprecation(property.map(|p| p.deprecation.clone()).unwrap_or_default())
                    .arguments(arguments),
            );
        }
        Ok(fields)
    }

    fn check_reserved_names(&self, fields: &[Field]) -> Result<(), SchemaError> {
        match fields
            .iter()
            .find(|f| f.name.starts_with(self.reserved_prefix.as_str()))
        {
            Some(field) => Err(SchemaError::ReservedName {
                name: field.name.clone(),
                prefix: self.reserved_prefix.clone(),
            }),
            None => Ok(()),
        }
    }

    fn handle_input_type(&mut self, shape: &Shape) -> Result<TypeId, SchemaError> {
        if let Some(id) = self.input_types.get(shape) {
            return Ok(*id);
        }

        let raw = shape.raw_type();
        self.assert_valid_object_type(raw)?;

        let definition = self.definition;
        let descriptor = definition
            .input_objects
            .iter()
            .rev()
            .find(|d| d.host == raw);
        let name = self.type_name(shape, descriptor.map(|d| &d.name));
        let description = descriptor.and_then(|d| d.description.clone());

        __typegraph_debug!(name = %name, "constructing input type");

        let id = self.allocate(TypeProxy::placeholder(name.clone(), TypeKind::InputObject));
        self.input_types.insert(shape.clone(), id);

        let hosts = self.hosts;
        let mut input_fields = Vec::new();
        if !hosts.get(raw).is_some_and(|h| h.not_introspected) {
            let scope = Scope { shape, raw };
            for member in hosts.exposed_members(raw) {
                if member.visibility != Visibility::Public {
                    continue;
                }
                let member_shape = self.concrete(Some(scope), &member.shape);
                let arg_type = self.handle_possibly_wrapped(&member_shape, Category::Input)?;
                input_fields.push(Argument::new(member.name.clone(), arg_type));
            }
        }

        let meta = InputObjectMeta::new(name, raw, input_fields).description(description);
        self.proxy_mut(id).fill(meta.into_meta())?;
        Ok(id)
    }

    fn handle_union(&mut self, union: &UnionDef) -> Result<TypeId, SchemaError> {
        if let Some(entry) = self.unions.iter().find(|u| u.name == union.name) {
            return Ok(entry.id);
        }

        __typegraph_debug!(name = %union.name, "constructing union type");

        let id = self.allocate(TypeProxy::placeholder(union.name.clone(), TypeKind::Union));
        self.unions.push(UnionEntry {
            id,
            name: union.name.clone(),
            claims: union.claims,
        });

        let mut of_types = Vec::with_capacity(union.members.len());
        for member in &union.members {
            let member = self.handle_raw(&Shape::raw(*member), Category::Query)?;
            of_types.push(member.innermost());
        }

        let invalid = of_types
            .iter()
            .map(|id| self.proxy(*id))
            .filter(|p| p.kind() != TypeKind::Object)
            .map(|p| p.name().clone())
            .collect::<Vec<_>>();
        if !invalid.is_empty() {
            return Err(SchemaError::InvalidUnionMembers {
                union: union.name.clone(),
                members: invalid,
            });
        }

        let meta = UnionMeta::new(union.name.clone(), of_types, Field::typename(self.string))
            .description(union.description.clone());
        self.proxy_mut(id).fill(meta.into_meta())?;
        Ok(id)
    }

    /// Assigns interface implementations from the host type hierarchy.
    fn introspect_relations(&mut self) {
        let candidates = self
            .query_types
            .iter()
            .map(|(shape, id)| Candidate {
                id: *id,
                host: shape.raw_type(),
                kind: self.proxy(*id).kind(),
            })
            .filter(|c| matches!(c.kind, TypeKind::Object | TypeKind::Interface))
            .collect::<Vec<_>>();

        let relations = Relations::infer(self.hosts, &candidates);

        for candidate in &candidates {
            match self.proxy_mut(candidate.id).meta_mut() {
                Some(MetaType::Object(object)) => {
                    object.interfaces = relations.interfaces_of(candidate.id).to_vec();
                }
                Some(MetaType::Interface(interface)) => {
                    interface.possible_types = relations.possible_types_of(candidate.id).to_vec();
                }
                _ => {}
            }
        }

        __typegraph_debug!(candidates = candidates.len(), "inferred type relations");
    }

    fn into_model(
        self,
        query: TypeId,
        mutation: Option<TypeId>,
        subscription: Option<TypeId>,
        directives: Vec<DirectiveType>,
    ) -> Result<SchemaModel, SchemaError> {
        let roots = [Some(query), mutation, subscription];
        let unions = self.registry(self.unions.iter().map(|u| u.id))?;
        let enums = self.registry(self.enums.values().copied())?;
        let scalars = self.registry(self.scalars.values().copied())?;
        let query_types = self.registry(
            roots
                .into_iter()
                .flatten()
                .chain(self.query_types.values().copied())
                .chain(unions.values().copied())
                .chain(enums.values().copied())
                .chain(scalars.values().copied()),
        )?;
        let input_types = self.registry(
            self.input_types
                .values()
                .copied()
                .chain(enums.values().copied())
                .chain(scalars.values().copied()),
        )?;
        // Input types share names with their output counterparts.
        let all_types = query_types
            .values()
            .chain(input_types.values())
            .copied()
            .unique()
            .collect::<Vec<_>>();

        let hosts = self
            .query_types
            .iter()
            .filter(|(shape, _)| matches!(shape, Shape::Raw(_)))
            .map(|(shape, id)| (shape.raw_type(), *id))
            .chain(self.enums.iter().map(|(host, id)| (*host, *id)))
            .chain(self.scalars.iter().map(|(host, id)| (*host, *id)))
            .collect::<FnvHashMap<_, _>>();

        __typegraph_debug!(
            types = self.proxies.len(),
            query_types = query_types.len(),
            input_types = input_types.len(),
            "compiled schema"
        );

        let types = self
            .proxies
            .into_iter()
            .map(TypeProxy::into_meta)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SchemaModel {
            types,
            query,
            mutation,
            subscription,
            query_types,
            input_types,
            all_types,
            enums,
            scalars,
            unions,
            directives,
            hosts,
        })
    }

    /// Indexes types of one category by name, rejecting distinct types sharing one.
    fn registry(
        &self,
        ids: impl IntoIterator<Item = TypeId>,
    ) -> Result<IndexMap<ArcStr, TypeId>, SchemaError> {
        let mut registry = IndexMap::new();
        for id in ids {
            let name = self.proxy(id).name().clone();
            match registry.get(&name) {
                Some(existing) if *existing != id => {
                    return Err(SchemaError::DuplicateTypeName { name });
                }
                Some(_) => {}
                None => {
                    registry.insert(name, id);
                }
            }
        }
        Ok(registry)
    }
}
