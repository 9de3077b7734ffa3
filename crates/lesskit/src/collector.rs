use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::Path;

use crate::resolver::SourceRoots;
use crate::types::{ResolvedSource, SourceKind, PARTIAL_MARKER, SOURCE_EXTENSIONS};

/// Expand brace patterns like `**/*.{less,lss}` into multiple patterns
fn expand_brace_pattern(pattern: &str) -> Vec<String> {
    if let Some(start) = pattern.find('{') {
        if let Some(end) = pattern[start..].find('}') {
            let end = start + end;
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let alternatives = &pattern[start + 1..end];

            return alternatives
                .split(',')
                .flat_map(|alt| {
                    let expanded = format!("{prefix}{alt}{suffix}");
                    expand_brace_pattern(&expanded)
                })
                .collect();
        }
    }
    vec![pattern.to_string()]
}

/// Compile a list of glob patterns into a GlobSet for efficient matching
pub(crate) fn compile_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        for expanded in expand_brace_pattern(pattern) {
            if let Ok(glob) = Glob::new(&expanded) {
                builder.add(glob);
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap())
}

/// Enumerates compilable stylesheet sources under the registered roots.
pub struct Collector {
    matcher: GlobSet,
}

impl Collector {
    pub fn new() -> Self {
        let pattern = format!("**/*.{{{}}}", SOURCE_EXTENSIONS.join(","));
        Self { matcher: compile_globset(&[pattern]) }
    }

    /// Collect every compilable source, partials excluded.
    ///
    /// Roots keep registration order; entries within a root come back in
    /// filesystem order, so callers must not rely on ordering beyond the
    /// root-level grouping.
    pub fn collect(&self, roots: &SourceRoots) -> Vec<ResolvedSource> {
        let mut sources = Vec::new();

        for root in roots.iter() {
            let walker = WalkBuilder::new(root).hidden(false).git_ignore(false).build();

            for entry in walker.flatten() {
                let path = entry.path();

                if !path.is_file() {
                    continue;
                }

                let relative = path.strip_prefix(root).unwrap_or(path);
                if !self.matcher.is_match(relative) {
                    continue;
                }

                if is_partial(path) {
                    continue;
                }

                let Some(kind) = SourceKind::of_path(path) else {
                    continue;
                };

                sources.push(ResolvedSource {
                    path: path.to_path_buf(),
                    root: root.clone(),
                    kind,
                });
            }
        }

        sources
    }
}

fn is_partial(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with(PARTIAL_MARKER))
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
