use ctrans_context::ContextError;
use ctrans_diagnostics::{messages, Diagnostic};
use miette::SourceSpan;
use thiserror::Error;

/// Errors that abort emission of a translation unit.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EmitError {
    /// A scope operation failed with no source location to blame.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Context(#[from] ContextError),

    /// A name used in the source did not resolve.
    #[error("{source}")]
    #[diagnostic(code(ctrans_emitter::unresolved))]
    Unresolved {
        source: ContextError,
        #[label("used here")]
        span: SourceSpan,
    },

    #[error("failed to write output: {0}")]
    #[diagnostic(code(ctrans_emitter::io))]
    Io(#[from] std::io::Error),
}

impl EmitError {
    /// The user-facing diagnostic for errors caused by the source text.
    /// I/O failures have none.
    pub fn to_diagnostic(&self, file_name: &str) -> Option<Diagnostic> {
        let (source, span) = match self {
            EmitError::Context(source) => (source, None),
            EmitError::Unresolved { source, span } => (source, Some(*span)),
            EmitError::Io(_) => return None,
        };
        let (message, name) = match source {
            ContextError::TypeNotFound { name } => (&messages::_0_IS_NOT_A_TYPE_NAME, name.as_str()),
            ContextError::ChunkNotFound { name } => (&messages::_0_UNDECLARED_IDENTIFIER, name.as_str()),
            ContextError::ScopeUnderflow => (&messages::SCOPE_UNDERFLOW, ""),
        };
        let diagnostic = match span {
            Some(span) => Diagnostic::with_location(
                file_name.to_string(),
                ctrans_core::TextSpan::new(span.offset() as u32, span.len() as u32),
                message,
                &[name],
            ),
            None => {
                let mut diagnostic = Diagnostic::new(message, &[name]);
                diagnostic.file = Some(file_name.to_string());
                diagnostic
            }
        };
        Some(diagnostic)
    }
}

pub type EmitResult<T> = Result<T, EmitError>;
