//! ctrans_options: ctrans.json parsing and compiler options.
//!
//! Parses project files and provides the `CompilerOptions` structure the
//! driver fills from the file and then overrides from the command line.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_INDENT: &str = "\t";
pub const MAX_VERBOSITY: u8 = 3;

/// Compiler options, matching the `compilerOptions` object of ctrans.json.
///
/// Every field is optional so a file or command line only states what it
/// changes; the accessor methods supply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerOptions {
    pub target: Option<OutputTarget>,
    pub out_file: Option<String>,
    pub indent: Option<String>,
    pub emit_trailer: Option<bool>,
    pub verbosity: Option<u8>,
}

/// Output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Python,
    Mips,
}

impl CompilerOptions {
    pub fn target(&self) -> OutputTarget {
        self.target.unwrap_or_default()
    }

    pub fn indent(&self) -> &str {
        self.indent.as_deref().unwrap_or(DEFAULT_INDENT)
    }

    pub fn emit_trailer(&self) -> bool {
        self.emit_trailer.unwrap_or(true)
    }

    /// 0 (quiet) to 3 (trace); larger values are clamped.
    pub fn verbosity(&self) -> u8 {
        self.verbosity.unwrap_or(0).min(MAX_VERBOSITY)
    }

    /// Overlay every option `overrides` sets.
    pub fn merge(&mut self, overrides: CompilerOptions) {
        let CompilerOptions {
            target,
            out_file,
            indent,
            emit_trailer,
            verbosity,
        } = overrides;
        if target.is_some() {
            self.target = target;
        }
        if out_file.is_some() {
            self.out_file = out_file;
        }
        if indent.is_some() {
            self.indent = indent;
        }
        if emit_trailer.is_some() {
            self.emit_trailer = emit_trailer;
        }
        if verbosity.is_some() {
            self.verbosity = verbosity;
        }
    }
}

/// The ctrans.json file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtransConfig {
    pub compiler_options: Option<CompilerOptions>,
    /// Input files, relative to the config file.
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a ctrans.json file from a string.
pub fn parse_config(content: &str) -> Result<CtransConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse a ctrans.json file from a path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<CtransConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}
