use std::fs;
use std::path::Path;

use crate::cache::{persist, CacheManager};
use crate::collector::Collector;
use crate::compiler::CompilerRegistry;
use crate::reporter;
use crate::resolver::StylesheetResolver;
use crate::types::{Config, LesskitError};

/// Full-tree regeneration and cleanup across every registered root.
///
/// A fault on one file aborts the remainder of the batch; per-file fault
/// collection is not attempted.
pub struct BatchDriver<'a> {
    config: &'a Config,
    compilers: &'a CompilerRegistry,
    resolver: &'a StylesheetResolver,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        config: &'a Config,
        compilers: &'a CompilerRegistry,
        resolver: &'a StylesheetResolver,
    ) -> Self {
        Self { config, compilers, resolver }
    }

    /// Regenerate every compilable source and refresh the public tree.
    ///
    /// The public copy is rewritten when it is absent or its root directory
    /// changed after the copy was written. That root-level check is coarser
    /// than the per-file one inside `generate` on purpose: it governs only
    /// the web-servable tree, independent of the internal cache tree.
    /// Prints a notice per file written; skips are silent.
    pub fn parse_all(&self) -> Result<(), LesskitError> {
        let cache = CacheManager::new(self.config, self.compilers);
        let collector = Collector::new();

        for source in collector.collect(self.resolver.roots()) {
            let key = self.resolver.key_for(&source);
            let text = cache.generate(self.resolver, &key)?;

            let public = self.resolver.public_path_for(&source, &self.config.destination_path);
            if needs_refresh(&source.root, &public) {
                persist(&public, &text)?;
                reporter::notice_written(&public);
            }
        }

        Ok(())
    }

    /// Delete every derived artifact from the public tree. Absent files are
    /// silently skipped; a notice is printed per file deleted.
    pub fn clean_all(&self) -> Result<(), LesskitError> {
        let collector = Collector::new();

        for source in collector.collect(self.resolver.roots()) {
            let public = self.resolver.public_path_for(&source, &self.config.destination_path);
            if public.is_file() {
                fs::remove_file(&public)?;
                reporter::notice_removed(&public);
            }
        }

        Ok(())
    }
}

/// Refresh when the destination is absent or the source root directory is
/// newer than the destination.
fn needs_refresh(root: &Path, destination: &Path) -> bool {
    let Ok(dest_mtime) = fs::metadata(destination).and_then(|m| m.modified()) else {
        return true;
    };
    match fs::metadata(root).and_then(|m| m.modified()) {
        Ok(root_mtime) => root_mtime > dest_mtime,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, CompilerError};
    use crate::types::Environment;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    struct UpcasingCompiler {
        calls: Arc<AtomicUsize>,
    }

    impl Compiler for UpcasingCompiler {
        fn extensions(&self) -> &[&str] {
            &["less", "lss"]
        }

        fn compile(&self, source: &str, _path: &Path) -> Result<String, CompilerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(source.to_uppercase())
        }
    }

    struct Fixture {
        project: TempDir,
        config: Config,
        resolver: StylesheetResolver,
        compilers: CompilerRegistry,
        calls: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let project = tempdir().unwrap();
        let app_root = project.path().join("app/stylesheets");
        let plugin_root = project.path().join("plugins/tracker/stylesheets");
        fs::create_dir_all(&app_root).unwrap();
        fs::create_dir_all(&plugin_root).unwrap();
        fs::write(app_root.join("screen.less"), "body { color: red; }").unwrap();
        fs::write(app_root.join("_mixins.less"), "ignored").unwrap();
        fs::write(plugin_root.join("board.less"), "table { width: 100%; }").unwrap();

        let mut config = Config::for_environment(Environment::Production, project.path());
        config.compression = false;

        let mut resolver = StylesheetResolver::new(project.path());
        resolver.add_root(&app_root);
        resolver.add_root(&plugin_root);

        let calls = Arc::new(AtomicUsize::new(0));
        let mut compilers = CompilerRegistry::new();
        compilers.register(Arc::new(UpcasingCompiler { calls: Arc::clone(&calls) }));

        Fixture { project, config, resolver, compilers, calls }
    }

    fn public_paths(fixture: &Fixture) -> (std::path::PathBuf, std::path::PathBuf) {
        let base = fixture.project.path().canonicalize().unwrap();
        (
            base.join("public/stylesheets/screen.css"),
            base.join("public/plugin-assets/tracker/stylesheets/board.css"),
        )
    }

    #[test]
    fn test_parse_all_writes_public_tree() {
        let fixture = fixture();
        let driver = BatchDriver::new(&fixture.config, &fixture.compilers, &fixture.resolver);

        driver.parse_all().unwrap();

        let (screen, board) = public_paths(&fixture);
        assert_eq!(fs::read_to_string(screen).unwrap(), "BODY { COLOR: RED; }\n");
        assert_eq!(fs::read_to_string(board).unwrap(), "TABLE { WIDTH: 100%; }\n");
        // The partial was never compiled
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 2);
        assert!(!fixture
            .project
            .path()
            .join("public/stylesheets/_mixins.css")
            .exists());
    }

    #[test]
    fn test_parse_all_is_idempotent() {
        let fixture = fixture();
        let driver = BatchDriver::new(&fixture.config, &fixture.compilers, &fixture.resolver);

        driver.parse_all().unwrap();
        let (screen, _) = public_paths(&fixture);
        let first_mtime = fs::metadata(&screen).unwrap().modified().unwrap();

        driver.parse_all().unwrap();
        let second_mtime = fs::metadata(&screen).unwrap().modified().unwrap();

        // Nothing was rewritten: the roots did not change after the first pass
        assert_eq!(first_mtime, second_mtime);
        // And the cache served the second pass without recompiling
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_parse_all_restores_deleted_output() {
        let fixture = fixture();
        let driver = BatchDriver::new(&fixture.config, &fixture.compilers, &fixture.resolver);

        driver.parse_all().unwrap();
        let (screen, _) = public_paths(&fixture);
        fs::remove_file(&screen).unwrap();

        driver.parse_all().unwrap();
        assert_eq!(fs::read_to_string(screen).unwrap(), "BODY { COLOR: RED; }\n");
    }

    #[test]
    fn test_clean_all_removes_outputs_and_is_idempotent() {
        let fixture = fixture();
        let driver = BatchDriver::new(&fixture.config, &fixture.compilers, &fixture.resolver);

        driver.parse_all().unwrap();
        driver.clean_all().unwrap();

        let (screen, board) = public_paths(&fixture);
        assert!(!screen.exists());
        assert!(!board.exists());

        // Absent files are silently skipped
        driver.clean_all().unwrap();
    }

    #[test]
    fn test_clean_then_parse_round_trips() {
        let fixture = fixture();
        let driver = BatchDriver::new(&fixture.config, &fixture.compilers, &fixture.resolver);

        driver.parse_all().unwrap();
        let (screen, board) = public_paths(&fixture);
        let screen_before = fs::read_to_string(&screen).unwrap();
        let board_before = fs::read_to_string(&board).unwrap();

        driver.clean_all().unwrap();
        driver.parse_all().unwrap();

        assert_eq!(fs::read_to_string(&screen).unwrap(), screen_before);
        assert_eq!(fs::read_to_string(&board).unwrap(), board_before);
    }
}
