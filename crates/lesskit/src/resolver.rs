use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

use crate::collector::compile_globset;
use crate::types::{
    key_is_partial, ResolvedSource, SourceKind, CACHE_DIR, OUTPUT_EXTENSION, PLUGIN_ASSETS_DIR,
    PLUGIN_SOURCE_PREFIX, PLUGIN_STYLESHEET_DIR, PUBLIC_DIR, SOURCE_EXTENSIONS,
};

/// Ordered, de-duplicated search roots for stylesheet sources.
///
/// Order matters: the first root yielding a match wins. Roots are appended
/// during startup and never removed.
#[derive(Debug, Clone, Default)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
}

impl SourceRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root; duplicates (by resolved path equality) are ignored.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let path = path.canonicalize().unwrap_or(path);
        if !self.roots.contains(&path) {
            self.roots.push(path);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.roots.iter()
    }

    pub fn first(&self) -> Option<&PathBuf> {
        self.roots.first()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Maps artifact keys to source files and source files to their derived
/// output locations.
pub struct StylesheetResolver {
    roots: SourceRoots,
    project_root: PathBuf,
}

impl StylesheetResolver {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let project_root = project_root.canonicalize().unwrap_or(project_root);
        Self { roots: SourceRoots::new(), project_root }
    }

    pub fn add_root(&mut self, path: impl Into<PathBuf>) {
        self.roots.add(path);
    }

    pub fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Locate the source file for a key.
    ///
    /// Each root is tried in registration order with the accepted extensions
    /// in css, less, lss order; the first existing file wins. When no root
    /// matches, a legacy fallback globs the first registered root for the
    /// key and returns whatever turns up, which may be nothing.
    pub fn resolve_source(&self, key: &[String]) -> Option<ResolvedSource> {
        let rel: PathBuf = key.iter().collect();

        for root in self.roots.iter() {
            for ext in SOURCE_EXTENSIONS {
                let candidate = root.join(format!("{}.{ext}", rel.display()));
                if candidate.is_file() {
                    let kind = SourceKind::of_path(&candidate)?;
                    return Some(ResolvedSource { path: candidate, root: root.clone(), kind });
                }
            }
        }

        self.glob_first_root(&rel)
    }

    /// Legacy fallback: glob the first registered root for the key. Callers
    /// must treat the absence of a hit as NotFound, never assume validity.
    fn glob_first_root(&self, rel: &Path) -> Option<ResolvedSource> {
        let root = self.roots.first()?;
        let pattern = format!("{}.{{{}}}", rel.display(), SOURCE_EXTENSIONS.join(","));
        let matcher = compile_globset(&[pattern]);

        let walker = WalkBuilder::new(root).hidden(false).git_ignore(false).build();
        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(root).unwrap_or(path);
            if matcher.is_match(relative) {
                let kind = SourceKind::of_path(path)?;
                return Some(ResolvedSource { path: path.to_path_buf(), root: root.clone(), kind });
            }
        }

        None
    }

    /// Whether a real source backs the key. Partial keys report false even
    /// when a matching file is physically present.
    pub fn exists(&self, key: &[String]) -> bool {
        if key_is_partial(key) {
            return false;
        }
        self.resolve_source(key).is_some()
    }

    /// Recover the logical key of an enumerated source.
    pub fn key_for(&self, source: &ResolvedSource) -> Vec<String> {
        let rel = source
            .path
            .strip_prefix(&source.root)
            .unwrap_or(&source.path)
            .with_extension("");

        rel.components()
            .filter_map(|c| match c {
                Component::Normal(os) => os.to_str().map(str::to_string),
                _ => None,
            })
            .collect()
    }

    /// Location of the internal cache copy for a source.
    pub fn cache_path_for(&self, source: &ResolvedSource) -> PathBuf {
        self.project_root.join(CACHE_DIR).join(self.derived_rel_path(source, None))
    }

    /// Location of the public, web-servable copy for a source.
    pub fn public_path_for(&self, source: &ResolvedSource, destination: &str) -> PathBuf {
        self.project_root.join(PUBLIC_DIR).join(self.derived_rel_path(source, Some(destination)))
    }

    /// Relative derived path: the source's path relative to its owning root
    /// with the extension swapped, namespaced under `plugin-assets/<name>`
    /// when the source is plugin-owned. The cache tree applies the same
    /// namespacing (without `destination`) so same-named sources from
    /// different roots cannot collide.
    fn derived_rel_path(&self, source: &ResolvedSource, destination: Option<&str>) -> PathBuf {
        let rel = source
            .path
            .strip_prefix(&source.root)
            .unwrap_or(&source.path)
            .with_extension(OUTPUT_EXTENSION);

        let mut out = PathBuf::new();
        if let Some(plugin) = self.plugin_name(&source.path) {
            out.push(PLUGIN_ASSETS_DIR);
            out.push(plugin);
        }
        if let Some(destination) = destination {
            out.push(destination);
        }
        out.push(rel);
        out
    }

    /// Plugin directory name when the source lives under
    /// `plugins/<name>/stylesheets` relative to the project root.
    fn plugin_name(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.project_root).ok()?;
        let mut parts = rel.components().filter_map(|c| match c {
            Component::Normal(os) => os.to_str(),
            _ => None,
        });

        if parts.next()? != PLUGIN_SOURCE_PREFIX {
            return None;
        }
        let name = parts.next()?;
        if parts.next()? != PLUGIN_STYLESHEET_DIR {
            return None;
        }
        Some(name.to_string())
    }
}
