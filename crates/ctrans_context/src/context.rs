//! The scope stack.
//!
//! Handles:
//! - Block entry and exit (`new_scope` / `del_scope`)
//! - Type and chunk registration in the innermost frame
//! - Innermost-to-outermost resolution with shadowing
//! - Offset assignment and slot reuse through a single running stack size

use crate::chunk::{Chunk, ChunkRef, StorageClass};
use crate::error::{ContextError, ContextResult};
use crate::scope::Frame;
use crate::types::{PrimitiveKind, Type, TypeRef};
use ctrans_core::intern::StringInterner;
use std::rc::Rc;

/// Nested-scope registry for one translation unit.
///
/// The global frame is held apart from the nested ones so it can never be
/// popped.
#[derive(Debug)]
pub struct Context {
    interner: StringInterner,
    global: Frame,
    /// Open nested frames, innermost last.
    nested: Vec<Frame>,
    /// Bytes held by every chunk registered in a still-open frame.
    stack_size: u32,
    /// Highest `stack_size` since construction or the last `reset_peak`.
    peak_stack_size: u32,
}

impl Context {
    /// An empty context: only the global frame, no names bound.
    pub fn new() -> Self {
        Self::with_interner(StringInterner::new())
    }

    /// An empty context keyed through an existing interner.
    pub fn with_interner(interner: StringInterner) -> Self {
        Self {
            interner,
            global: Frame::new(),
            nested: Vec::new(),
            stack_size: 0,
            peak_stack_size: 0,
        }
    }

    /// A context whose global frame already binds the built-in types.
    pub fn with_builtins() -> Self {
        let mut cx = Self::new();
        cx.register_builtins();
        cx
    }

    /// Bind the built-in types in the global frame.
    pub fn register_builtins(&mut self) {
        let int = Type::int().shared();
        let key = self.interner.intern_static(PrimitiveKind::Int.name());
        self.global.bind_type(key, int);
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Open a nested frame. The stack size is unchanged.
    pub fn new_scope(&mut self) {
        self.nested.push(Frame::new());
        log::trace!(
            "enter scope: depth={} stack_size={}",
            self.depth(),
            self.stack_size
        );
    }

    /// Close the innermost frame, dropping its bindings and releasing every
    /// byte it allocated.
    pub fn del_scope(&mut self) -> ContextResult<()> {
        let frame = self.nested.pop().ok_or(ContextError::ScopeUnderflow)?;
        debug_assert!(self.stack_size >= frame.allocated());
        self.stack_size -= frame.allocated();
        log::trace!(
            "leave scope: depth={} released={} stack_size={}",
            self.depth(),
            frame.allocated(),
            self.stack_size
        );
        Ok(())
    }

    /// Number of open frames above the global one.
    pub fn depth(&self) -> usize {
        self.nested.len()
    }

    pub fn is_global_scope(&self) -> bool {
        self.nested.is_empty()
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Bind `name` to `ty` in the innermost frame. A binding of the same name
    /// in that frame is overwritten; outer bindings are shadowed.
    pub fn register_type(&mut self, name: &str, ty: TypeRef) -> TypeRef {
        let key = self.interner.intern(name);
        log::trace!("register type `{}` = {} at depth {}", name, ty, self.depth());
        self.current_frame_mut().bind_type(key, Rc::clone(&ty));
        ty
    }

    pub fn resolve_type(&self, name: &str) -> ContextResult<TypeRef> {
        self.lookup_type(name)
            .ok_or_else(|| ContextError::TypeNotFound { name: name.to_string() })
    }

    /// Like [`resolve_type`](Self::resolve_type) for callers that only probe.
    pub fn lookup_type(&self, name: &str) -> Option<TypeRef> {
        let key = self.interner.get(name)?;
        self.frames().find_map(|frame| frame.type_of(key)).cloned()
    }

    // ========================================================================
    // Chunks
    // ========================================================================

    /// Allocate a chunk for `name` at the current stack size and bind it in
    /// the innermost frame.
    ///
    /// Chunks registered in the global frame are `Global`, all others `Local`.
    /// Globals and locals share one offset counter.
    pub fn register_chunk(&mut self, name: &str, ty: TypeRef) -> ChunkRef {
        let storage_class = if self.is_global_scope() {
            StorageClass::Global
        } else {
            StorageClass::Local
        };
        let chunk = Rc::new(Chunk::new(ty, storage_class, self.stack_size));
        self.stack_size += chunk.size();
        self.peak_stack_size = self.peak_stack_size.max(self.stack_size);

        let key = self.interner.intern(name);
        log::trace!(
            "register chunk `{}`: {} at depth {}",
            name,
            chunk,
            self.depth()
        );
        self.current_frame_mut().bind_chunk(key, Rc::clone(&chunk));
        chunk
    }

    pub fn resolve_chunk(&self, name: &str) -> ContextResult<ChunkRef> {
        self.lookup_chunk(name)
            .ok_or_else(|| ContextError::ChunkNotFound { name: name.to_string() })
    }

    /// Like [`resolve_chunk`](Self::resolve_chunk) for callers that only probe.
    pub fn lookup_chunk(&self, name: &str) -> Option<ChunkRef> {
        let key = self.interner.get(name)?;
        self.frames().find_map(|frame| frame.chunk_of(key)).cloned()
    }

    /// Whether registering a chunk named `name` now would hide a chunk bound
    /// by an enclosing frame.
    pub fn would_shadow_chunk(&self, name: &str) -> bool {
        let Some(key) = self.interner.get(name) else {
            return false;
        };
        let mut frames = self.frames();
        match frames.next() {
            Some(innermost) if innermost.chunk_of(key).is_none() => {
                frames.any(|frame| frame.chunk_of(key).is_some())
            }
            _ => false,
        }
    }

    // ========================================================================
    // Stack accounting
    // ========================================================================

    /// Bytes held by chunks in open frames; the offset the next chunk gets.
    pub fn get_stack_size(&self) -> u32 {
        self.stack_size
    }

    /// Highest stack size reached since construction or the last
    /// [`reset_peak`](Self::reset_peak).
    pub fn peak_stack_size(&self) -> u32 {
        self.peak_stack_size
    }

    /// Lower the peak mark to the current stack size.
    pub fn reset_peak(&mut self) {
        self.peak_stack_size = self.stack_size;
    }

    /// Bytes allocated by the innermost frame.
    pub fn frame_bytes(&self) -> u32 {
        self.nested.last().unwrap_or(&self.global).allocated()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn current_frame_mut(&mut self) -> &mut Frame {
        self.nested.last_mut().unwrap_or(&mut self.global)
    }

    /// Frames from innermost to outermost.
    fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.nested.iter().rev().chain(std::iter::once(&self.global))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WORD_BYTES;

    #[test]
    fn test_builtins_bind_int_globally() {
        let mut cx = Context::with_builtins();
        let int = cx.resolve_type("int").unwrap();
        assert_eq!(int.size(), WORD_BYTES);
        cx.new_scope();
        assert!(Rc::ptr_eq(&cx.resolve_type("int").unwrap(), &int));
    }

    #[test]
    fn test_builtins_with_shared_interner() {
        let interner = StringInterner::new();
        let mut cx = Context::with_interner(interner.clone());
        cx.register_builtins();
        cx.new_scope();
        assert!(cx.lookup_type("int").is_some());
        assert_eq!(cx.get_stack_size(), 0);
        assert!(interner.get("int").is_some());
    }

    #[test]
    fn test_lookup_of_never_seen_name_is_none() {
        let cx = Context::new();
        assert!(cx.lookup_chunk("nothing").is_none());
        assert!(cx.lookup_type("nothing").is_none());
        assert!(cx.interner().is_empty());
    }

    #[test]
    fn test_types_and_chunks_are_separate_namespaces() {
        let mut cx = Context::new();
        let ty = cx.register_type("x", Type::int().shared());
        assert!(cx.lookup_chunk("x").is_none());
        cx.register_chunk("x", ty);
        assert!(cx.lookup_type("x").is_some());
        assert!(cx.lookup_chunk("x").is_some());
    }

    #[test]
    fn test_would_shadow_chunk() {
        let mut cx = Context::new();
        let ty = Type::int().shared();
        assert!(!cx.would_shadow_chunk("a"));
        cx.register_chunk("a", Rc::clone(&ty));
        assert!(!cx.would_shadow_chunk("a"));
        cx.new_scope();
        assert!(cx.would_shadow_chunk("a"));
        cx.register_chunk("a", ty);
        assert!(!cx.would_shadow_chunk("a"));
    }

    #[test]
    fn test_frame_bytes_tracks_innermost() {
        let mut cx = Context::new();
        let ty = Type::int().shared();
        cx.register_chunk("g", Rc::clone(&ty));
        assert_eq!(cx.frame_bytes(), WORD_BYTES);
        cx.new_scope();
        assert_eq!(cx.frame_bytes(), 0);
        cx.register_chunk("l1", Rc::clone(&ty));
        cx.register_chunk("l2", ty);
        assert_eq!(cx.frame_bytes(), 2 * WORD_BYTES);
        cx.del_scope().unwrap();
        assert_eq!(cx.frame_bytes(), WORD_BYTES);
    }
}
