use lesskit::{Compiler, CompilerError, Config, Environment, Stylesheets};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct EchoCompiler;

impl Compiler for EchoCompiler {
    fn extensions(&self) -> &[&str] {
        &["less", "lss"]
    }

    fn compile(&self, source: &str, _path: &Path) -> Result<String, CompilerError> {
        Ok(format!("/* compiled */\n{source}"))
    }
}

fn project_fixture() -> (TempDir, Stylesheets) {
    let project = TempDir::new().unwrap();
    let app_root = project.path().join("app/stylesheets");
    let plugin_root = project.path().join("plugins/wiki/stylesheets");
    fs::create_dir_all(app_root.join("admin")).unwrap();
    fs::create_dir_all(&plugin_root).unwrap();

    fs::write(app_root.join("screen.less"), "body { margin: 0; }").unwrap();
    fs::write(app_root.join("admin/tables.less"), "table { border: 0; }").unwrap();
    fs::write(app_root.join("print.css"), "body { font-size: 10pt; }").unwrap();
    fs::write(app_root.join("_shared.less"), "never compiled alone").unwrap();
    fs::write(plugin_root.join("wiki.less"), "pre { overflow: auto; }").unwrap();

    let mut config = Config::for_environment(Environment::Production, project.path());
    config.compression = false;

    let mut engine = Stylesheets::new(config);
    engine.register_compiler(Arc::new(EchoCompiler));
    engine.add_root(&app_root);
    engine.add_root(&plugin_root);

    (project, engine)
}

fn derived_files(project: &TempDir) -> Vec<PathBuf> {
    let base = project.path().canonicalize().unwrap();
    vec![
        base.join("public/stylesheets/screen.css"),
        base.join("public/stylesheets/admin/tables.css"),
        base.join("public/stylesheets/print.css"),
        base.join("public/plugin-assets/wiki/stylesheets/wiki.css"),
    ]
}

#[test]
fn test_parse_all_covers_both_trees() {
    let (project, engine) = project_fixture();

    engine.parse_all().unwrap();

    for path in derived_files(&project) {
        assert!(path.is_file(), "missing derived file: {}", path.display());
    }

    // Pass-through CSS is copied verbatim, compiled output carries the marker
    let base = project.path().canonicalize().unwrap();
    assert_eq!(
        fs::read_to_string(base.join("public/stylesheets/print.css")).unwrap(),
        "body { font-size: 10pt; }\n"
    );
    assert!(fs::read_to_string(base.join("public/stylesheets/screen.css"))
        .unwrap()
        .starts_with("/* compiled */"));

    // Partials never reach the public tree
    assert!(!base.join("public/stylesheets/_shared.css").exists());
}

#[test]
fn test_clean_all_then_parse_all_are_inverses() {
    let (project, engine) = project_fixture();

    engine.parse_all().unwrap();
    let before: Vec<String> = derived_files(&project)
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();

    engine.clean_all().unwrap();
    for path in derived_files(&project) {
        assert!(!path.exists());
    }

    engine.parse_all().unwrap();
    let after: Vec<String> = derived_files(&project)
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();

    assert_eq!(before, after);
}

#[test]
fn test_clean_all_on_empty_tree_is_a_noop() {
    let (_project, engine) = project_fixture();
    engine.clean_all().unwrap();
}
