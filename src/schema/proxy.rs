//! Forward-reference cell of a type under construction.

use arcstr::ArcStr;

use super::{
    SchemaError,
    meta::{MetaType, PlaceholderMeta, TypeKind},
};

/// Slot of the compiler's type arena.
///
/// A proxy is born either complete (for types without members to compile)
/// or as a placeholder, which other types may already reference by its
/// [`TypeId`]. A placeholder is completed exactly once.
///
/// [`TypeId`]: super::meta::TypeId
#[derive(Clone, Debug)]
pub(crate) struct TypeProxy {
    meta: MetaType,
    complete: bool,
}

impl TypeProxy {
    pub(crate) fn placeholder(name: ArcStr, kind: TypeKind) -> Self {
        Self {
            meta: MetaType::Placeholder(PlaceholderMeta { name, kind }),
            complete: false,
        }
    }

    pub(crate) fn complete(meta: MetaType) -> Self {
        Self {
            meta,
            complete: true,
        }
    }

    pub(crate) fn name(&self) -> &ArcStr {
        self.meta.name()
    }

    /// Kind of the proxied type, known before it is complete.
    pub(crate) fn kind(&self) -> TypeKind {
        self.meta.type_kind()
    }

    /// Replaces the placeholder with the completed type.
    pub(crate) fn fill(&mut self, meta: MetaType) -> Result<(), SchemaError> {
        if self.complete {
            return Err(SchemaError::ProxyAlreadyComplete {
                name: self.name().clone(),
            });
        }
        self.meta = meta;
        self.complete = true;
        Ok(())
    }

    /// Completed type, for the post-pass to amend.
    pub(crate) fn meta_mut(&mut self) -> Option<&mut MetaType> {
        self.complete.then_some(&mut self.meta)
    }

    pub(crate) fn into_meta(self) -> Result<MetaType, SchemaError> {
        if !self.complete {
            return Err(SchemaError::IncompleteType {
                name: self.meta.name().clone(),
            });
        }
        Ok(self.meta)
    }
}
