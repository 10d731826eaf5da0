//! Type values stored in the type namespace and referenced by chunks.

use std::fmt;
use std::rc::Rc;

/// Size of a machine word on the target, in bytes.
pub const WORD_BYTES: u32 = 4;

/// Broad classification of a type. Composite categories slot in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Primitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
}

impl PrimitiveKind {
    pub fn size(self) -> u32 {
        match self {
            PrimitiveKind::Int => WORD_BYTES,
        }
    }

    /// The C spelling of the type.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Int => "int",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
}

/// An immutable type. Shared between frames and chunks through [`TypeRef`].
///
/// Two `TypeRef`s are the *same* type when `Rc::ptr_eq` holds; `==` compares
/// structure, so separately registered `int`s are equal but not identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    kind: TypeKind,
}

pub type TypeRef = Rc<Type>;

impl Type {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            kind: TypeKind::Primitive(kind),
        }
    }

    pub fn int() -> Self {
        Self::primitive(PrimitiveKind::Int)
    }

    /// Move into a shared handle.
    pub fn shared(self) -> TypeRef {
        Rc::new(self)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn category(&self) -> TypeCategory {
        match self.kind {
            TypeKind::Primitive(_) => TypeCategory::Primitive,
        }
    }

    /// The primitive kind, or `None` for non-primitive categories.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(kind) => Some(kind),
        }
    }

    /// Storage size in bytes. Always positive.
    pub fn size(&self) -> u32 {
        match self.kind {
            TypeKind::Primitive(kind) => kind.size(),
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::int()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Primitive(kind) => f.write_str(kind.name()),
        }
    }
}
