//! Structural relationship inference.
//!
//! Interface implementations are never declared explicitly: once every
//! output type exists, an object implements each interface whose host type
//! is a strict supertype of its own host type.

use fnv::FnvHashMap;

use crate::{
    host::{HostTypeId, HostTypes},
    schema::meta::{TypeId, TypeKind},
};

/// Output type taking part in the inference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Candidate {
    /// Compiled type.
    pub id: TypeId,
    /// Host type it was built from.
    pub host: HostTypeId,
    /// Kind of the compiled type, only objects and interfaces are related.
    pub kind: TypeKind,
}

/// Membership table computed over a closed set of candidates.
#[derive(Clone, Debug, Default)]
pub struct Relations {
    interfaces: FnvHashMap<TypeId, Vec<TypeId>>,
    possible_types: FnvHashMap<TypeId, Vec<TypeId>>,
}

impl Relations {
    /// Relates every object of `candidates` to the interfaces it implements.
    ///
    /// Results keep the order of `candidates`.
    pub fn infer(hosts: &HostTypes, candidates: &[Candidate]) -> Self {
        let of_kind = |kind: TypeKind| candidates.iter().filter(move |c| c.kind == kind);

        let mut relations = Self::default();
        for interface in of_kind(TypeKind::Interface) {
            let possible = of_kind(TypeKind::Object)
                .filter(|o| hosts.is_strict_subtype_of(o.host, interface.host))
                .map(|o| o.id)
                .collect();
            relations.possible_types.insert(interface.id, possible);
        }
        for object in of_kind(TypeKind::Object) {
            let interfaces = of_kind(TypeKind::Interface)
                .filter(|i| hosts.is_strict_subtype_of(object.host, i.host))
                .map(|i| i.id)
                .collect();
            relations.interfaces.insert(object.id, interfaces);
        }
        relations
    }

    /// Interfaces implemented by an object.
    pub fn interfaces_of(&self, object: TypeId) -> &[TypeId] {
        self.interfaces.get(&object).map_or(&[], Vec::as_slice)
    }

    /// Objects implementing an interface.
    pub fn possible_types_of(&self, interface: TypeId) -> &[TypeId] {
        self.possible_types.get(&interface).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::{Candidate, Relations};
    use crate::{
        host::{HostType, HostTypes},
        schema::meta::{TypeId, TypeKind},
        shape::Shape,
    };

    #[test]
    fn relates_subtypes_only() {
        let mut hosts = HostTypes::new();
        let named = hosts.declare(HostType::interface("demo.Named"));
        let person = hosts.declare(HostType::class("demo.Person").implements(Shape::raw(named)));
        let pet = hosts.declare(HostType::class("demo.Pet").implements(Shape::raw(named)));
        let rock = hosts.declare(HostType::class("demo.Rock"));

        let candidate = |id, host, kind| Candidate {
            id: TypeId(id),
            host,
            kind,
        };
        let candidates = [
            candidate(0, named, TypeKind::Interface),
            candidate(1, person, TypeKind::Object),
            candidate(2, pet, TypeKind::Object),
            candidate(3, rock, TypeKind::Object),
        ];

        let relations = Relations::infer(&hosts, &candidates);

        assert_eq!(relations.possible_types_of(TypeId(0)), [TypeId(1), TypeId(2)]);
        assert_eq!(relations.interfaces_of(TypeId(1)), [TypeId(0)]);
        assert_eq!(relations.interfaces_of(TypeId(2)), [TypeId(0)]);
        assert!(relations.interfaces_of(TypeId(3)).is_empty());
        assert!(relations.interfaces_of(TypeId(0)).is_empty());
    }
}
