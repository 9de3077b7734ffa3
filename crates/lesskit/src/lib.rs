pub mod batch;
pub mod cache;
pub mod cli;
pub mod collector;
pub mod compiler;
pub mod reporter;
pub mod resolver;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

pub use compiler::{Compiler, CompilerError, CompilerRegistry, LessCompiler};
pub use resolver::{SourceRoots, StylesheetResolver};
pub use types::{
    parse_key, Config, Environment, FileConfig, LesskitError, ResolvedSource, SourceKind,
};

use batch::BatchDriver;
use cache::CacheManager;

/// The stylesheet engine: registered source roots, process configuration,
/// and the compiler registry, wired together.
///
/// Construct it once at startup, register roots and compilers, then treat
/// it as read-only for the life of the process.
///
/// # Example
/// ```no_run
/// use lesskit::{Config, Environment, Stylesheets};
///
/// let config = Config::for_environment(Environment::Production, ".");
/// let mut engine = Stylesheets::new(config).with_builtin_compilers().unwrap();
/// engine.add_root("app/stylesheets");
///
/// let css = engine.generate(&["screen".to_string()]).unwrap();
/// ```
pub struct Stylesheets {
    config: Config,
    resolver: StylesheetResolver,
    compilers: CompilerRegistry,
}

impl Stylesheets {
    pub fn new(config: Config) -> Self {
        let resolver = StylesheetResolver::new(config.project_root.clone());
        Self { config, resolver, compilers: CompilerRegistry::new() }
    }

    /// Register the built-in less compiler. Fails fast when the external
    /// executable is missing; that is a startup error, not a per-request one.
    pub fn with_builtin_compilers(mut self) -> Result<Self, CompilerError> {
        self.compilers.register_builtins()?;
        Ok(self)
    }

    /// Register a custom compiler for the extensions it reports.
    pub fn register_compiler(&mut self, compiler: Arc<dyn Compiler>) {
        self.compilers.register(compiler);
    }

    /// Append a source root. Duplicates are ignored; registration order
    /// decides resolution priority.
    pub fn add_root(&mut self, path: impl Into<PathBuf>) {
        self.resolver.add_root(path);
    }

    /// Whether a real, non-partial source backs the key.
    pub fn exists(&self, key: &[String]) -> bool {
        self.resolver.exists(key)
    }

    /// Generate one stylesheet, serving the on-disk cache when it is fresh.
    pub fn generate(&self, key: &[String]) -> Result<String, LesskitError> {
        CacheManager::new(&self.config, &self.compilers).generate(&self.resolver, key)
    }

    /// Regenerate every stylesheet and refresh the public tree.
    pub fn parse_all(&self) -> Result<(), LesskitError> {
        BatchDriver::new(&self.config, &self.compilers, &self.resolver).parse_all()
    }

    /// Delete every derived stylesheet from the public tree.
    pub fn clean_all(&self) -> Result<(), LesskitError> {
        BatchDriver::new(&self.config, &self.compilers, &self.resolver).clean_all()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &StylesheetResolver {
        &self.resolver
    }
}
