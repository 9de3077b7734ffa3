use super::{Compiler, CompilerError, LessCompiler};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Registry of compilers mapped by file extension
pub struct CompilerRegistry {
    /// Map of extension (without dot) -> compiler
    compilers: FxHashMap<String, Arc<dyn Compiler>>,
}

impl CompilerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { compilers: FxHashMap::default() }
    }

    /// Register a compiler for all its supported extensions
    pub fn register(&mut self, compiler: Arc<dyn Compiler>) {
        for ext in compiler.extensions() {
            self.compilers.insert((*ext).to_string(), Arc::clone(&compiler));
        }
    }

    /// Register the built-in less compiler, probing first that the external
    /// executable is present. A missing executable is fatal at startup.
    pub fn register_builtins(&mut self) -> Result<(), CompilerError> {
        let less = LessCompiler::new();
        less.probe()?;
        self.register(Arc::new(less));
        Ok(())
    }

    /// Get compiler for a file extension (without dot, e.g., "less")
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Compiler>> {
        self.compilers.get(extension)
    }

    /// Get all registered extensions
    pub fn extensions(&self) -> impl Iterator<Item = &String> {
        self.compilers.keys()
    }

    /// Check if a compiler is registered for the given extension
    pub fn has_compiler(&self, extension: &str) -> bool {
        self.compilers.contains_key(extension)
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct FakeCompiler;

    impl Compiler for FakeCompiler {
        fn extensions(&self) -> &[&str] {
            &["less", "lss"]
        }

        fn compile(&self, source: &str, _path: &Path) -> Result<String, CompilerError> {
            Ok(source.to_string())
        }
    }

    #[test]
    fn test_register_maps_all_extensions() {
        let mut registry = CompilerRegistry::new();
        registry.register(Arc::new(FakeCompiler));

        assert!(registry.has_compiler("less"));
        assert!(registry.has_compiler("lss"));
        assert!(!registry.has_compiler("css"));
        assert!(registry.get("less").is_some());
    }

    #[test]
    fn test_empty_registry() {
        let registry = CompilerRegistry::new();
        assert!(!registry.has_compiler("less"));
        assert_eq!(registry.extensions().count(), 0);
    }
}
