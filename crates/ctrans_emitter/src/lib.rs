//! ctrans_emitter: Python and MIPS output.
//!
//! Walks a parsed translation unit while keeping a scope stack in step with
//! it:
//! 1. Register every declaration in the innermost scope
//! 2. Resolve every variable use, failing on undeclared names
//! 3. Write the target text
//! 4. Place the output file next to the input or at `out_file`

mod context;
mod error;
mod mips;
mod python;

pub use context::EmitContext;
pub use error::{EmitError, EmitResult};
pub use mips::{fold_constant, layout_function, FrameLayout};

use ctrans_ast::node::TranslationUnit;
use ctrans_core::intern::StringInterner;
use ctrans_diagnostics::DiagnosticCollection;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A node that can write itself as target text.
pub trait Emit {
    fn emit(&self, cx: &mut EmitContext<'_>, out: &mut dyn Write) -> EmitResult<()>;
}

/// What to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Python 3 source.
    #[default]
    Python,
    /// MIPS assembly skeleton: data words and function frames.
    Mips,
}

impl Target {
    /// Extension of the default output file.
    pub fn extension(self) -> &'static str {
        match self {
            Target::Python => "py",
            Target::Mips => "s",
        }
    }
}

/// Options for the emitter.
#[derive(Debug, Clone)]
pub struct EmitterOptions {
    /// Indentation string for one block level.
    pub indent: String,
    /// Whether to append the block that runs `main` to Python output.
    pub emit_trailer: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            emit_trailer: true,
        }
    }
}

/// The emitter produces an output file from a translation unit.
pub struct Emitter {
    pub target: Target,
    pub options: EmitterOptions,
    /// Output file override.
    pub out_file: Option<PathBuf>,
}

/// The result of emitting a translation unit.
#[derive(Debug)]
pub struct EmitOutput {
    pub output_file: OutputFile,
    /// Warnings raised during the walk.
    pub diagnostics: DiagnosticCollection,
}

/// A file produced by the emitter.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub text: String,
}

impl Emitter {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            options: EmitterOptions::default(),
            out_file: None,
        }
    }

    /// Emit `unit`. Identifiers are keyed through `interner`, which should be
    /// the one the parser used.
    pub fn emit(&self, unit: &TranslationUnit<'_>, interner: &StringInterner) -> EmitResult<EmitOutput> {
        log::info!("emitting {} as {:?}", unit.file_name, self.target);
        let mut cx = EmitContext::new(&self.options, &unit.file_name, interner.clone());
        let mut buffer = Vec::with_capacity(4096);
        match self.target {
            Target::Python => unit.emit(&mut cx, &mut buffer)?,
            Target::Mips => mips::emit_translation_unit(unit, &mut cx, &mut buffer)?,
        }
        let text = String::from_utf8(buffer)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        Ok(EmitOutput {
            output_file: OutputFile {
                path: self.get_output_path(Path::new(&unit.file_name)),
                text,
            },
            diagnostics: cx.take_diagnostics(),
        })
    }

    /// Write the output file to disk.
    pub fn write_output_file(&self, output: &EmitOutput) -> std::io::Result<()> {
        let file = &output.output_file;
        if let Some(parent) = file.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        log::info!("writing {}", file.path.display());
        std::fs::write(&file.path, &file.text)
    }

    pub fn get_output_path(&self, source: &Path) -> PathBuf {
        match self.out_file {
            Some(ref out_file) => out_file.clone(),
            None => source.with_extension(self.target.extension()),
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(Target::default())
    }
}
