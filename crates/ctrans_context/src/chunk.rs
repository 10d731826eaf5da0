//! Storage chunks: one per declared variable.

use crate::types::TypeRef;
use std::fmt;
use std::rc::Rc;

/// Where a chunk lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Declared in the global frame.
    Global,
    /// Declared in a nested frame, i.e. on the current function's stack.
    Local,
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageClass::Global => write!(f, "global"),
            StorageClass::Local => write!(f, "local"),
        }
    }
}

/// A storage location. Never mutated after the context creates it; popping
/// the declaring frame only hides it from lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    ty: TypeRef,
    storage_class: StorageClass,
    offset: u32,
}

pub type ChunkRef = Rc<Chunk>;

impl Chunk {
    pub(crate) fn new(ty: TypeRef, storage_class: StorageClass, offset: u32) -> Self {
        Self {
            ty,
            storage_class,
            offset,
        }
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }

    /// Byte offset assigned at registration.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.ty.size()
    }

    /// First byte past this chunk.
    pub fn end(&self) -> u32 {
        self.offset + self.size()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.storage_class, self.ty, self.offset)
    }
}
