use std::fs;
use std::path::Path;

use crate::compiler::{postprocess, CompilerError, CompilerRegistry};
use crate::reporter;
use crate::resolver::StylesheetResolver;
use crate::types::{Config, LesskitError, ResolvedSource, SourceKind};

/// Decides reuse-vs-recompile for one artifact and keeps the on-disk cache
/// tree in step with its sources.
pub struct CacheManager<'a> {
    config: &'a Config,
    compilers: &'a CompilerRegistry,
}

impl<'a> CacheManager<'a> {
    pub fn new(config: &'a Config, compilers: &'a CompilerRegistry) -> Self {
        Self { config, compilers }
    }

    /// Serve the cached artifact when it is at least as new as its source,
    /// otherwise regenerate and persist.
    ///
    /// A cache hit returns the persisted bytes verbatim; header and
    /// compression were already applied when they were written. Persisting
    /// is best-effort: a failed write is reported but the generated text is
    /// still returned.
    pub fn generate(
        &self,
        resolver: &StylesheetResolver,
        key: &[String],
    ) -> Result<String, LesskitError> {
        let source = resolver
            .resolve_source(key)
            .ok_or_else(|| LesskitError::SourceNotFound(key.to_vec()))?;
        let cache_path = resolver.cache_path_for(&source);

        if self.config.cache_enabled && is_fresh(&cache_path, &source.path) {
            return Ok(fs::read_to_string(&cache_path)?);
        }

        let text = self.render(&source)?;

        if self.config.cache_enabled {
            if let Err(e) = persist(&cache_path, &text) {
                reporter::warn_persist(&cache_path, &e);
            }
        }

        Ok(text)
    }

    /// Produce the output text for a source, ignoring the cache.
    pub fn render(&self, source: &ResolvedSource) -> Result<String, LesskitError> {
        match source.kind {
            SourceKind::PassThrough => Ok(fs::read_to_string(&source.path)?),
            SourceKind::Compile => {
                let ext = source.path.extension().and_then(|e| e.to_str()).unwrap_or_default();
                let compiler = self.compilers.get(ext).ok_or_else(|| {
                    CompilerError::MissingCompiler(format!(
                        "no compiler registered for .{ext} files"
                    ))
                })?;

                let raw = fs::read_to_string(&source.path)?;
                let css = compiler.compile(&raw, &source.path)?;
                Ok(postprocess(&css, self.config, &source.path))
            }
        }
    }
}

/// Freshness check for the cached copy. Equal timestamps count as a hit:
/// when the filesystem cannot order the two writes, reuse wins over a
/// pointless recompile.
fn is_fresh(cached: &Path, source: &Path) -> bool {
    let Ok(cached_mtime) = fs::metadata(cached).and_then(|m| m.modified()) else {
        return false;
    };
    let Ok(source_mtime) = fs::metadata(source).and_then(|m| m.modified()) else {
        return false;
    };
    cached_mtime >= source_mtime
}

/// Write a derived artifact, creating its directory tree first. The text
/// gets a single trailing newline; one already present is not doubled.
pub(crate) fn persist(path: &Path, text: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut buf = String::with_capacity(text.len() + 1);
    buf.push_str(text);
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    fs::write(path, buf)
}
