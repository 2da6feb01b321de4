//! Resolution of type variables against a concrete usage context.
//!
//! Given the shape a declaration is used with (the context, e.g.
//! `Connection<String, Int>`) and a shape declared somewhere in the context's
//! type hierarchy (e.g. `List<Edge<T, K>>`), the functions here substitute
//! every type variable they can, producing `List<Edge<String, Int>>`.
//!
//! Resolution is stateless: every call tracks the variables it visits on its
//! own, so a variable that resolves back to itself is returned as is instead
//! of being chased forever.

use fnv::FnvHashMap;

use crate::{
    host::{HostTypeId, HostTypes},
    shape::{GenericDeclaration, Shape, TypeVariable},
};

/// Resolves `to_resolve` in the context of `context`, whose raw type is
/// `context_raw`.
///
/// Variables that cannot be resolved are left in place, so callers should
/// check the result with [`Shape::has_type_variables()`].
pub fn resolve(
    hosts: &HostTypes,
    context: &Shape,
    context_raw: HostTypeId,
    to_resolve: &Shape,
) -> Shape {
    let mut visited = FnvHashMap::default();
    resolve_with(hosts, context, context_raw, to_resolve.clone(), &mut visited)
}

/// Resolution state of a visited variable: `None` while it is being resolved.
type Visited = FnvHashMap<TypeVariable, Option<Shape>>;

fn resolve_with(
    hosts: &HostTypes,
    context: &Shape,
    context_raw: HostTypeId,
    to_resolve: Shape,
    visited: &mut Visited,
) -> Shape {
    let mut resolving = None;
    let mut current = to_resolve;

    let resolved = loop {
        match current {
            Shape::Variable(variable) => {
                match visited.get(&variable) {
                    // Cannot reduce any further due to infinite recursion.
                    Some(None) => break Shape::Variable(variable),
                    Some(Some(previous)) => break previous.clone(),
                    None => {}
                }
                visited.insert(variable.clone(), None);
                if resolving.is_none() {
                    resolving = Some(variable.clone());
                }

                let next = resolve_type_variable(hosts, context, context_raw, &variable);
                if next == Shape::Variable(variable) {
                    break next;
                }
                current = next;
            }
            Shape::Array(component) => {
                break Shape::array(resolve_with(hosts, context, context_raw, *component, visited));
            }
            Shape::Parameterized { owner, raw, args } => {
                let owner = owner.map(|o| resolve_with(hosts, context, context_raw, *o, visited));
                let args = args
                    .into_iter()
                    .map(|a| resolve_with(hosts, context, context_raw, a, visited))
                    .collect();
                break Shape::nested(owner, raw, args);
            }
            Shape::Wildcard {
                lower: Some(lower), ..
            } => {
                break Shape::supertype_of(resolve_with(
                    hosts,
                    context,
                    context_raw,
                    *lower,
                    visited,
                ));
            }
            Shape::Wildcard { upper, lower: None } => {
                break Shape::subtype_of(resolve_with(hosts, context, context_raw, *upper, visited));
            }
            Shape::Nullable(inner) => {
                break resolve_with(hosts, context, context_raw, *inner, visited).nullable();
            }
            raw @ Shape::Raw(_) => break raw,
        }
    };

    if let Some(variable) = resolving {
        visited.insert(variable, Some(resolved.clone()));
    }
    resolved
}

/// Resolves a single type variable by locating its declaring host type in the
/// supertype hierarchy of `context` and picking the matching type argument.
///
/// Returns the variable itself if it cannot be reduced, e.g. because it is
/// declared by a function, or the context does not parameterize its
/// declaring type.
pub fn resolve_type_variable(
    hosts: &HostTypes,
    context: &Shape,
    context_raw: HostTypeId,
    variable: &TypeVariable,
) -> Shape {
    let unresolved = || Shape::Variable(variable.clone());

    let GenericDeclaration::Type(declared_by_raw) = variable.declared_by else {
        return unresolved();
    };
    let Some(declaring) = hosts.get(declared_by_raw) else {
        return unresolved();
    };

    match generic_supertype(hosts, context, context_raw, declared_by_raw) {
        Shape::Parameterized { args, .. } => declaring
            .type_params
            .iter()
            .position(|p| *p == variable.name)
            .and_then(|index| args.into_iter().nth(index))
            .unwrap_or_else(unresolved),
        _ => unresolved(),
    }
}

/// Returns the generic form of `to_resolve` as seen from `context`.
///
/// For example, given a context `IntegerSet` implementing `Set<Int>`, the
/// generic supertype for `Set` is `Set<Int>`, and for `Collection` it is
/// `Collection<Int>`. Interfaces are searched first, then the superclass
/// chain. If `to_resolve` is not a supertype of `context_raw`, its raw shape is
/// returned.
pub fn generic_supertype(
    hosts: &HostTypes,
    context: &Shape,
    context_raw: HostTypeId,
    to_resolve: HostTypeId,
) -> Shape {
    if to_resolve == context_raw {
        return context.non_null().clone();
    }

    let (Some(raw_host), Some(target)) = (hosts.get(context_raw), hosts.get(to_resolve)) else {
        return Shape::Raw(to_resolve);
    };

    // Interfaces can only be reached through other interfaces.
    if target.is_interface() {
        for interface in &raw_host.interfaces {
            let interface_raw = interface.raw_type();
            if interface_raw == to_resolve {
                return interface.clone();
            }
            if hosts.is_subtype_of(interface_raw, to_resolve) {
                return generic_supertype(hosts, interface, interface_raw, to_resolve);
            }
        }
    }

    if !raw_host.is_interface() {
        let mut raw = context_raw;
        while raw != HostTypes::ANY {
            let Some(superclass) = hosts.get(raw).and_then(|h| h.superclass.as_ref()) else {
                break;
            };
            let super_raw = superclass.raw_type();
            if super_raw == to_resolve {
                return superclass.clone();
            }
            if hosts.is_subtype_of(super_raw, to_resolve) {
                return generic_supertype(hosts, superclass, super_raw, to_resolve);
            }
            raw = super_raw;
        }
    }

    Shape::Raw(to_resolve)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{generic_supertype, resolve};
    use crate::{
        host::{HostType, HostTypes},
        shape::Shape,
    };

    fn string() -> Shape {
        Shape::raw(HostTypes::STRING)
    }

    fn int() -> Shape {
        Shape::raw(HostTypes::INT)
    }

    #[test]
    fn substitutes_parameters_of_the_context() {
        let mut hosts = HostTypes::new();
        let edge = hosts.declare(
            HostType::class("demo.Connection.Edge")
                .type_param("T")
                .type_param("K"),
        );
        let connection = hosts.declare(
            HostType::class("demo.Connection")
                .type_param("T")
                .type_param("K"),
        );
        hosts[connection].push_member(crate::host::Member::new(
            "edges",
            Shape::list_of(Shape::parameterized(
                edge,
                vec![
                    Shape::variable(connection, "T"),
                    Shape::variable(connection, "K"),
                ],
            )),
        ));

        let context = Shape::parameterized(connection, vec![string(), int()]);
        let declared = hosts[connection].members[0].shape.clone();

        assert_eq!(
            resolve(&hosts, &context, connection, &declared),
            Shape::list_of(Shape::parameterized(edge, vec![string(), int()])),
        );
    }

    #[test]
    fn walks_the_superclass_chain() {
        let mut hosts = HostTypes::new();
        let base = hosts.declare(HostType::open_class("demo.Base").type_param("E"));
        let middle = hosts.declare(HostType::open_class("demo.Middle").type_param("M"));
        let page = hosts.declare(HostType::class("demo.Page").type_param("T"));
        // Middle<M>: Base<List<M>>
        hosts[middle].superclass = Some(Shape::parameterized(
            base,
            vec![Shape::list_of(Shape::variable(middle, "M"))],
        ));
        // Page<T>: Middle<T?>
        hosts[page].superclass = Some(Shape::parameterized(
            middle,
            vec![Shape::variable(page, "T").nullable()],
        ));

        let context = Shape::parameterized(page, vec![string()]);

        assert_eq!(
            resolve(&hosts, &context, page, &Shape::variable(base, "E")),
            Shape::list_of(string().nullable()),
        );
        assert_eq!(
            generic_supertype(&hosts, &context, page, base),
            Shape::parameterized(base, vec![Shape::list_of(Shape::variable(middle, "M"))]),
        );
    }

    #[test]
    fn searches_interfaces_before_superclasses() {
        let mut hosts = HostTypes::new();
        let supplier = hosts.declare(HostType::interface("demo.Supplier").type_param("S"));
        let holder = hosts.declare(HostType::class("demo.Holder").type_param("H"));
        // Holder<H>: Supplier<H[]>
        hosts[holder].interfaces = vec![Shape::parameterized(
            supplier,
            vec![Shape::array(Shape::variable(holder, "H"))],
        )];

        let context = Shape::parameterized(holder, vec![int()]);

        assert_eq!(
            resolve(&hosts, &context, holder, &Shape::variable(supplier, "S")),
            Shape::array(int()),
        );
    }

    #[test]
    fn resolves_collection_elements_through_builtins() {
        let hosts = HostTypes::new();
        let context = Shape::list_of(string());

        let iterable = generic_supertype(&hosts, &context, HostTypes::LIST, HostTypes::ITERABLE);

        assert_eq!(
            resolve(&hosts, &context, HostTypes::LIST, &iterable),
            Shape::parameterized(HostTypes::ITERABLE, vec![string()]),
        );
    }

    #[test]
    fn resolves_wildcard_bounds() {
        let mut hosts = HostTypes::new();
        let sink = hosts.declare(HostType::class("demo.Sink").type_param("T"));
        let context = Shape::parameterized(sink, vec![int()]);

        let extends = Shape::list_of(Shape::subtype_of(Shape::variable(sink, "T")));
        let supers = Shape::list_of(Shape::supertype_of(Shape::variable(sink, "T")));

        assert_eq!(
            resolve(&hosts, &context, sink, &extends),
            Shape::list_of(Shape::subtype_of(int())),
        );
        assert_eq!(
            resolve(&hosts, &context, sink, &supers),
            Shape::list_of(Shape::supertype_of(int())),
        );
    }

    #[test]
    fn resolves_repeated_variables_every_time() {
        let mut hosts = HostTypes::new();
        let pair = hosts.declare(HostType::class("demo.Pair").type_param("T"));
        let map = hosts.declare(HostType::class("demo.Map").type_param("K").type_param("V"));
        let context = Shape::parameterized(pair, vec![string()]);
        let declared = Shape::parameterized(
            map,
            vec![Shape::variable(pair, "T"), Shape::variable(pair, "T")],
        );

        assert_eq!(
            resolve(&hosts, &context, pair, &declared),
            Shape::parameterized(map, vec![string(), string()]),
        );
    }

    #[test]
    fn leaves_unresolvable_variables_in_place() {
        let mut hosts = HostTypes::new();
        let page = hosts.declare(HostType::class("demo.Page").type_param("T"));

        let raw_context = Shape::raw(page);
        let of_function = Shape::function_variable("load", "R");

        assert_eq!(
            resolve(&hosts, &raw_context, page, &Shape::variable(page, "T")),
            Shape::variable(page, "T"),
        );
        assert_eq!(resolve(&hosts, &raw_context, page, &of_function), of_function);
    }

    #[test]
    fn stops_on_recursive_variables() {
        let mut hosts = HostTypes::new();
        let right = hosts.declare(HostType::open_class("demo.Right").type_param("B"));
        let left = hosts.declare(HostType::class("demo.Left").type_param("A"));
        hosts[left].superclass = Some(Shape::parameterized(
            right,
            vec![Shape::variable(left, "A")],
        ));

        // `Left<B>` where `B` is declared by `Right`, which `Left` maps back to `A`.
        let context = Shape::parameterized(left, vec![Shape::variable(right, "B")]);
        let resolved = resolve(&hosts, &context, left, &Shape::variable(left, "A"));

        assert!(matches!(resolved, Shape::Variable(_)));
        assert!(resolved.has_type_variables());
    }
}
