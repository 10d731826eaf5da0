//! ctrans_context: Types, storage chunks and the lexical scope stack.
//!
//! The translator registers every declaration it walks past and resolves
//! every use against a `Context`. The context keeps one frame per open
//! lexical block, each with its own type and chunk namespace, and assigns
//! each chunk a byte offset the way a compiler lays out a stack frame:
//! offsets grow while a block is open and are handed back when it closes,
//! so sibling blocks reuse the same slots.

mod chunk;
mod context;
mod error;
mod scope;
mod types;

pub use chunk::{Chunk, ChunkRef, StorageClass};
pub use context::Context;
pub use error::{ContextError, ContextResult};
pub use types::{PrimitiveKind, Type, TypeCategory, TypeKind, TypeRef, WORD_BYTES};
