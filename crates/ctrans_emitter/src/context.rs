//! State threaded through an emission walk.

use crate::error::{EmitError, EmitResult};
use crate::EmitterOptions;
use ctrans_ast::node::{Identifier, TypeSpecifier};
use ctrans_context::{ChunkRef, Context, ContextError, StorageClass, TypeRef};
use ctrans_core::intern::StringInterner;
use ctrans_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use indexmap::IndexSet;
use std::io::Write;
use std::rc::Rc;

/// The scope stack plus everything an emitter needs beside the output sink.
///
/// Every declaration the walk passes goes through [`declare_chunk`] or
/// [`declare_type`], and every use through [`resolve_chunk`] or
/// [`resolve_type`], so the underlying [`Context`] always mirrors the C
/// scopes enclosing the node being emitted.
///
/// [`declare_chunk`]: EmitContext::declare_chunk
/// [`declare_type`]: EmitContext::declare_type
/// [`resolve_chunk`]: EmitContext::resolve_chunk
/// [`resolve_type`]: EmitContext::resolve_type
pub struct EmitContext<'o> {
    scopes: Context,
    options: &'o EmitterOptions,
    file_name: String,
    indent_level: usize,
    /// Global variables in declaration order.
    globals: IndexSet<String>,
    /// Scope depth of the body of the function being emitted.
    function_depth: usize,
    /// Locals of the function being emitted that kept their C name.
    function_locals: IndexSet<String>,
    /// Every Python name the function being emitted has written so far.
    function_names: IndexSet<String>,
    /// Function locals written under another name because they hide an outer
    /// chunk that Python would otherwise confuse them with.
    renamed: Vec<(ChunkRef, String)>,
    /// Warnings raised during the walk.
    diagnostics: DiagnosticCollection,
}

impl<'o> EmitContext<'o> {
    pub fn new(options: &'o EmitterOptions, file_name: &str, interner: StringInterner) -> Self {
        let mut scopes = Context::with_interner(interner);
        scopes.register_builtins();
        Self {
            scopes,
            options,
            file_name: file_name.to_string(),
            indent_level: 0,
            globals: IndexSet::new(),
            function_depth: 0,
            function_locals: IndexSet::new(),
            function_names: IndexSet::new(),
            renamed: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn scopes(&self) -> &Context {
        &self.scopes
    }

    pub fn options(&self) -> &EmitterOptions {
        self.options
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    pub fn enter_scope(&mut self) {
        self.scopes.new_scope();
    }

    pub fn leave_scope(&mut self) -> EmitResult<()> {
        self.scopes.del_scope()?;
        Ok(())
    }

    /// Open the scope of a function body. Forgets the names bound by the
    /// previous function and restarts peak tracking at the current stack
    /// size.
    pub fn enter_function(&mut self) {
        self.function_locals.clear();
        self.function_names.clear();
        self.renamed.clear();
        self.scopes.reset_peak();
        self.enter_scope();
        self.function_depth = self.scopes.depth();
    }

    // ========================================================================
    // Declarations and uses
    // ========================================================================

    pub fn resolve_type(&self, specifier: &TypeSpecifier) -> EmitResult<TypeRef> {
        self.scopes
            .resolve_type(&specifier.name.text_name)
            .map_err(|source| unresolved(source, &specifier.name))
    }

    pub fn declare_type(&mut self, name: &Identifier, ty: TypeRef) -> TypeRef {
        self.scopes.register_type(&name.text_name, ty)
    }

    /// Register a variable in the innermost scope, warning when it hides an
    /// outer one.
    ///
    /// Python has one scope per function, so a local that hides a chunk the
    /// function can still reach is given its own Python name: one declared in
    /// a nested block, or one whose C name the function has already written.
    pub fn declare_chunk(&mut self, name: &Identifier, ty: TypeRef) -> ChunkRef {
        let text = name.text_name.as_str();
        let shadows = self.scopes.would_shadow_chunk(text);
        if shadows {
            self.diagnostics.add(Diagnostic::with_location(
                self.file_name.clone(),
                name.data.range.to_span(),
                &messages::_0_SHADOWS_AN_OUTER_DECLARATION,
                &[text],
            ));
        }
        let chunk = self.scopes.register_chunk(text, ty);
        match chunk.storage_class() {
            StorageClass::Global => {
                self.globals.insert(text.to_string());
            }
            StorageClass::Local => {
                let reachable_outer = shadows
                    && (self.scopes.depth() > self.function_depth
                        || self.function_names.contains(text));
                if reachable_outer || self.is_renamed(text) {
                    let python = self.fresh_name(text, chunk.offset());
                    log::debug!("local `{}` written as `{}`", text, python);
                    self.function_names.insert(python.clone());
                    self.renamed.push((Rc::clone(&chunk), python));
                } else {
                    self.function_locals.insert(text.to_string());
                    self.function_names.insert(text.to_string());
                }
            }
        }
        chunk
    }

    pub fn resolve_chunk(&self, name: &Identifier) -> EmitResult<ChunkRef> {
        self.scopes
            .resolve_chunk(&name.text_name)
            .map_err(|source| unresolved(source, name))
    }

    /// Resolve a use and return the Python name of the chunk it refers to.
    pub fn resolve_name(&mut self, name: &Identifier) -> EmitResult<String> {
        let chunk = self.resolve_chunk(name)?;
        Ok(self.python_name(name, &chunk))
    }

    /// The Python name `chunk` is written under. `name` is the C name it was
    /// reached through.
    pub fn python_name(&mut self, name: &Identifier, chunk: &ChunkRef) -> String {
        let python = self
            .renamed
            .iter()
            .rev()
            .find(|(renamed, _)| Rc::ptr_eq(renamed, chunk))
            .map_or_else(|| name.text_name.clone(), |(_, python)| python.clone());
        if !self.scopes.is_global_scope() {
            self.function_names.insert(python.clone());
        }
        python
    }

    fn is_renamed(&self, python: &str) -> bool {
        self.renamed.iter().any(|(_, name)| name == python)
    }

    /// `name_offset`, extended with underscores until nothing written so far
    /// uses it.
    fn fresh_name(&self, name: &str, offset: u32) -> String {
        let mut python = format!("{}_{}", name, offset);
        while self.globals.contains(&python) || self.function_names.contains(&python) {
            python.push('_');
        }
        python
    }

    /// Globals declared so far that the current function does not rebind.
    pub fn visible_globals(&self) -> Vec<&str> {
        self.globals
            .iter()
            .filter(|name| !self.function_locals.contains(*name))
            .map(String::as_str)
            .collect()
    }

    // ========================================================================
    // Indentation
    // ========================================================================

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn write_indent(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for _ in 0..self.indent_level {
            out.write_all(self.options.indent.as_bytes())?;
        }
        Ok(())
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }
}

fn unresolved(source: ContextError, at: &Identifier) -> EmitError {
    EmitError::Unresolved {
        source,
        span: at.data.range.to_span().into(),
    }
}
