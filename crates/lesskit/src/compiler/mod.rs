mod less;
mod registry;

pub use less::LessCompiler;
pub use registry::CompilerRegistry;

use std::path::Path;
use thiserror::Error;

use crate::types::Config;

/// Error types for compiler operations
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("less compiler unavailable: {0}")]
    MissingCompiler(String),

    #[error("compilation failed: {0}")]
    CompileFailed(String),
}

/// A compiler transforms stylesheet source text into CSS
pub trait Compiler: Send + Sync {
    /// File extensions this compiler handles (e.g., ["less", "lss"])
    fn extensions(&self) -> &[&str];

    /// Compile source text to CSS. Faults surface unmodified to the caller.
    fn compile(&self, source: &str, path: &Path) -> Result<String, CompilerError>;
}

/// Apply the configured output transforms to compiled CSS.
///
/// Compression deletes every newline character, nothing else. The header
/// banner is prepended after compression so it keeps its own line.
pub fn postprocess(css: &str, config: &Config, source: &Path) -> String {
    let mut out =
        if config.compression { css.replace('\n', "") } else { css.to_string() };

    if config.header {
        out = format!("/* Generated from {} */\n{out}", source.display());
    }

    out
}
