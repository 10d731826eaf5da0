//! ctrans_compiler: Compiler orchestration.
//!
//! Creates the program and drives every source file through
//! load, parse and emit, collecting diagnostics along the way.

use bumpalo::Bump;
use ctrans_core::intern::StringInterner;
use ctrans_diagnostics::DiagnosticCollection;
use ctrans_emitter::{EmitError, EmitOutput, Emitter, EmitterOptions, OutputFile, Target};
use ctrans_options::{CompilerOptions, ConfigError, OutputTarget};
use ctrans_parser::Parser;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Parse or translation errors, plus any warnings raised with them.
    #[error("compilation failed with {} error(s)", .0.error_count())]
    Diagnostics(DiagnosticCollection),

    /// An emit failure that has no source location, such as a failed write.
    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A source file held by the program.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub text: String,
}

/// The output of one source file.
#[derive(Debug)]
pub struct CompiledFile {
    pub output: OutputFile,
    /// Warnings raised while emitting.
    pub diagnostics: DiagnosticCollection,
}

/// The program represents the entire compilation.
pub struct Program {
    /// Compiler options.
    pub options: CompilerOptions,
    /// The root file names.
    pub root_files: Vec<String>,
    /// Shared by the parser and the emitter of every file.
    interner: StringInterner,
    source_files: Vec<SourceFile>,
}

impl Program {
    /// Create a new program from root files and options.
    pub fn new(root_files: Vec<String>, options: CompilerOptions) -> Self {
        Self {
            options,
            root_files,
            interner: StringInterner::new(),
            source_files: Vec::new(),
        }
    }

    /// Add a source file to the program.
    pub fn add_source(&mut self, file_name: String, text: String) {
        self.source_files.push(SourceFile { file_name, text });
    }

    /// Load all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), CompileError> {
        for file in &self.root_files {
            log::info!("loading {}", file);
            let text = std::fs::read_to_string(file).map_err(|source| CompileError::Io {
                path: file.clone(),
                source,
            })?;
            self.source_files.push(SourceFile {
                file_name: file.clone(),
                text,
            });
        }
        Ok(())
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    /// The text of a loaded file, for rendering diagnostics.
    pub fn source_text(&self, file_name: &str) -> Option<&str> {
        self.source_files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| f.text.as_str())
    }

    /// The emitter configured from the options.
    pub fn emitter(&self) -> Emitter {
        let target = match self.options.target() {
            OutputTarget::Python => Target::Python,
            OutputTarget::Mips => Target::Mips,
        };
        let mut emitter = Emitter::new(target);
        emitter.options = EmitterOptions {
            indent: self.options.indent().to_string(),
            emit_trailer: self.options.emit_trailer(),
        };
        match self.options.out_file {
            Some(ref out_file) if self.source_files.len() <= 1 => {
                emitter.out_file = Some(PathBuf::from(out_file));
            }
            Some(ref out_file) => {
                log::warn!(
                    "ignoring outFile `{}`: {} inputs would share it",
                    out_file,
                    self.source_files.len()
                );
            }
            None => {}
        }
        emitter
    }

    /// Run the full pipeline over every source file: parse, then emit.
    ///
    /// Every file is processed even after one fails, so the error carries
    /// the diagnostics of the whole program.
    pub fn compile(&self) -> Result<Vec<CompiledFile>, CompileError> {
        let emitter = self.emitter();
        let mut all_diagnostics = DiagnosticCollection::new();
        let mut compiled = Vec::with_capacity(self.source_files.len());

        for file in &self.source_files {
            match self.compile_file(&emitter, file)? {
                Ok(output) => {
                    all_diagnostics.extend(output.diagnostics.clone());
                    compiled.push(output);
                }
                Err(diagnostics) => all_diagnostics.extend(diagnostics),
            }
        }

        all_diagnostics.sort();
        if all_diagnostics.has_errors() {
            return Err(CompileError::Diagnostics(all_diagnostics));
        }
        Ok(compiled)
    }

    /// Compile, then write every output file.
    pub fn emit(&self) -> Result<Vec<CompiledFile>, CompileError> {
        let compiled = self.compile()?;
        let emitter = self.emitter();
        for file in &compiled {
            emitter
                .write_output_file(&EmitOutput {
                    output_file: file.output.clone(),
                    diagnostics: file.diagnostics.clone(),
                })
                .map_err(|source| CompileError::Io {
                    path: file.output.path.display().to_string(),
                    source,
                })?;
        }
        Ok(compiled)
    }

    /// The outer error aborts the program; the inner one is this file's
    /// source errors.
    fn compile_file(
        &self,
        emitter: &Emitter,
        file: &SourceFile,
    ) -> Result<Result<CompiledFile, DiagnosticCollection>, CompileError> {
        let arena = Bump::new();
        log::info!("parsing {}", file.file_name);
        let mut parser = Parser::with_interner(
            &arena,
            self.interner.clone(),
            &file.file_name,
            &file.text,
        );
        let unit = parser.parse_translation_unit();
        let diagnostics = parser.take_diagnostics();
        if diagnostics.has_errors() {
            log::debug!("{}: {} parse error(s)", file.file_name, diagnostics.error_count());
            return Ok(Err(diagnostics));
        }

        match emitter.emit(&unit, &self.interner) {
            Ok(output) => {
                let mut warnings = diagnostics;
                warnings.extend(output.diagnostics);
                Ok(Ok(CompiledFile {
                    output: output.output_file,
                    diagnostics: warnings,
                }))
            }
            Err(err) => match err.to_diagnostic(&file.file_name) {
                Some(diagnostic) => {
                    let mut diagnostics = diagnostics;
                    diagnostics.add(diagnostic);
                    Ok(Err(diagnostics))
                }
                None => Err(err.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_follows_options() {
        let options = CompilerOptions {
            target: Some(OutputTarget::Mips),
            indent: Some("  ".to_string()),
            emit_trailer: Some(false),
            out_file: Some("out.s".to_string()),
            ..Default::default()
        };
        let program = Program::new(vec![], options);
        let emitter = program.emitter();
        assert_eq!(emitter.target, Target::Mips);
        assert_eq!(emitter.options.indent, "  ");
        assert!(!emitter.options.emit_trailer);
        assert_eq!(emitter.out_file, Some(PathBuf::from("out.s")));
    }

    #[test]
    fn test_out_file_ignored_for_several_inputs() {
        let options = CompilerOptions {
            out_file: Some("out.py".to_string()),
            ..Default::default()
        };
        let mut program = Program::new(vec![], options);
        program.add_source("a.c".to_string(), String::new());
        program.add_source("b.c".to_string(), String::new());
        assert!(program.emitter().out_file.is_none());
    }

    #[test]
    fn test_source_text_lookup() {
        let mut program = Program::new(vec![], CompilerOptions::default());
        program.add_source("a.c".to_string(), "int x;".to_string());
        assert_eq!(program.source_text("a.c"), Some("int x;"));
        assert_eq!(program.source_text("b.c"), None);
    }
}
