//! A single lexical frame.

use crate::chunk::ChunkRef;
use crate::types::TypeRef;
use ctrans_core::intern::InternedString;
use rustc_hash::FxHashMap;

/// Bindings introduced by one lexical block.
#[derive(Debug, Default)]
pub struct Frame {
    types: FxHashMap<InternedString, TypeRef>,
    chunks: FxHashMap<InternedString, ChunkRef>,
    /// Bytes handed out while this frame was innermost, including chunks
    /// whose binding was later overwritten.
    allocated: u32,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_of(&self, name: InternedString) -> Option<&TypeRef> {
        self.types.get(&name)
    }

    pub fn chunk_of(&self, name: InternedString) -> Option<&ChunkRef> {
        self.chunks.get(&name)
    }

    /// Bind `name`, returning the binding it replaced in this frame.
    pub fn bind_type(&mut self, name: InternedString, ty: TypeRef) -> Option<TypeRef> {
        self.types.insert(name, ty)
    }

    /// Bind `name` and account for the chunk's bytes.
    pub fn bind_chunk(&mut self, name: InternedString, chunk: ChunkRef) -> Option<ChunkRef> {
        self.allocated += chunk.size();
        self.chunks.insert(name, chunk)
    }

    pub fn allocated(&self) -> u32 {
        self.allocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, StorageClass};
    use crate::types::Type;
    use ctrans_core::StringInterner;
    use std::rc::Rc;

    #[test]
    fn test_overwrite_keeps_allocation() {
        let interner = StringInterner::new();
        let x = interner.intern("x");
        let ty = Type::int().shared();

        let mut frame = Frame::new();
        let first = Rc::new(Chunk::new(Rc::clone(&ty), StorageClass::Local, 0));
        let second = Rc::new(Chunk::new(ty, StorageClass::Local, 4));
        assert!(frame.bind_chunk(x, Rc::clone(&first)).is_none());
        let replaced = frame.bind_chunk(x, Rc::clone(&second));

        assert!(replaced.is_some_and(|c| Rc::ptr_eq(&c, &first)));
        assert!(frame.chunk_of(x).is_some_and(|c| Rc::ptr_eq(c, &second)));
        assert_eq!(frame.chunks.len(), 1);
        assert_eq!(frame.allocated(), 8);
    }

    #[test]
    fn test_types_do_not_allocate() {
        let interner = StringInterner::new();
        let mut frame = Frame::new();
        frame.bind_type(interner.intern("word"), Type::int().shared());
        assert_eq!(frame.types.len(), 1);
        assert_eq!(frame.allocated(), 0);
    }
}
