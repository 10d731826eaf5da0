use miette::Diagnostic;
use thiserror::Error;

/// Failures raised by [`Context`](crate::Context).
///
/// All of these reflect a problem in the walk driving the context; a
/// translation unit that produces one is not emitted.
#[derive(Debug, Error, Diagnostic, Clone, Hash, PartialEq, Eq)]
pub enum ContextError {
    /// No open frame binds `name` in the type namespace.
    #[error("type `{name}` is not declared in any open scope")]
    #[diagnostic(code(ctrans_context::type_not_found))]
    TypeNotFound { name: String },

    /// No open frame binds `name` in the chunk namespace.
    #[error("`{name}` is not declared in any open scope")]
    #[diagnostic(
        code(ctrans_context::chunk_not_found),
        help("declare the variable before its first use")
    )]
    ChunkNotFound { name: String },

    /// `del_scope` was called with only the global frame open.
    #[error("cannot leave the global scope")]
    #[diagnostic(code(ctrans_context::scope_underflow))]
    ScopeUnderflow,
}

impl ContextError {
    /// Whether this is one of the not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TypeNotFound { .. } | Self::ChunkNotFound { .. })
    }

    /// The unresolved name, for the not-found variants.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::TypeNotFound { name } | Self::ChunkNotFound { name } => Some(name),
            Self::ScopeUnderflow => None,
        }
    }
}

pub type ContextResult<T> = Result<T, ContextError>;
