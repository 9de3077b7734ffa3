use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compiler::CompilerError;

/// File extensions accepted as stylesheet sources, in resolution order.
pub const SOURCE_EXTENSIONS: &[&str] = &["css", "less", "lss"];

/// Extension of every derived artifact.
pub const OUTPUT_EXTENSION: &str = "css";

/// Base names starting with this marker are partials: importable by other
/// sources, never compiled on their own.
pub const PARTIAL_MARKER: char = '_';

/// Project-relative directory holding plugin source trees.
pub const PLUGIN_SOURCE_PREFIX: &str = "plugins";

/// Directory inside a plugin that holds its stylesheet sources.
pub const PLUGIN_STYLESHEET_DIR: &str = "stylesheets";

/// Public subdirectory receiving plugin-owned derived artifacts.
pub const PLUGIN_ASSETS_DIR: &str = "plugin-assets";

/// Internal cache tree, relative to the project root.
pub const CACHE_DIR: &str = "tmp/stylesheet-cache";

/// Public tree, relative to the project root.
pub const PUBLIC_DIR: &str = "public";

/// How a source file turns into CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Already CSS; served verbatim.
    PassThrough,
    /// LESS-family source; runs through a registered compiler.
    Compile,
}

impl SourceKind {
    /// Map a file extension (without dot) to its kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "css" => Some(Self::PassThrough),
            "less" | "lss" => Some(Self::Compile),
            _ => None,
        }
    }

    /// Kind of the file at `path`, judged by its extension.
    pub fn of_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }
}

/// A source file located under one registered root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// The registered root that owns it.
    pub root: PathBuf,
    pub kind: SourceKind,
}

/// Runtime environment selecting configuration defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
    Test,
}

impl Environment {
    /// Parse an environment name. Unrecognized names fall back to
    /// production so an unexpected deployment name gets the safe defaults.
    pub fn from_name(name: &str) -> Self {
        match name {
            "development" => Self::Development,
            "test" => Self::Test,
            _ => Self::Production,
        }
    }
}

/// Process-wide configuration, constructed once at startup and passed by
/// reference into every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strip newlines from compiled output.
    pub compression: bool,
    /// Prepend a banner comment naming the originating source.
    pub header: bool,
    /// Subdirectory of `public/` receiving derived stylesheets.
    pub destination_path: String,
    /// Keep an on-disk cache of derived artifacts under `tmp/`.
    pub cache_enabled: bool,
    /// Directory the cache and public trees hang off.
    pub project_root: PathBuf,
}

impl Config {
    /// Environment defaults. Explicit overrides (CLI flags, config file)
    /// are applied on top by the caller.
    pub fn for_environment(environment: Environment, project_root: impl Into<PathBuf>) -> Self {
        let production = matches!(environment, Environment::Production);
        Self {
            compression: production,
            header: !production,
            destination_path: "stylesheets".to_string(),
            cache_enabled: production,
            project_root: project_root.into(),
        }
    }
}

/// Config file structure for lesskit.json / lesskit.jsonc
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub compression: Option<bool>,

    #[serde(default)]
    pub header: Option<bool>,

    #[serde(default)]
    pub destination_path: Option<String>,

    #[serde(default)]
    pub cache_enabled: Option<bool>,

    /// Source roots, searched in order. Relative paths resolve against the
    /// project root.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// Error types for lesskit operations
#[derive(Error, Debug)]
pub enum LesskitError {
    #[error("no stylesheet source found for key: {}", .0.join("/"))]
    SourceNotFound(Vec<String>),

    #[error("compiler error: {0}")]
    Compiler(#[from] CompilerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// True when the key's last segment carries the partial marker.
pub fn key_is_partial(key: &[String]) -> bool {
    key.last().is_some_and(|s| s.starts_with(PARTIAL_MARKER))
}

/// Split a `dir/name` request string into key segments.
pub fn parse_key(raw: &str) -> Vec<String> {
    raw.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect()
}
