use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use lesskit::cli::{Cli, Command};
use lesskit::{parse_key, Config, Environment, FileConfig, LesskitError, Stylesheets};

/// Find default config file in the project root
fn find_default_config(dir: &Path) -> Option<PathBuf> {
    let json_path = dir.join("lesskit.json");
    if json_path.exists() {
        return Some(json_path);
    }

    let jsonc_path = dir.join("lesskit.jsonc");
    if jsonc_path.exists() {
        return Some(jsonc_path);
    }

    None
}

/// Load config from file path, supporting .json and .jsonc
fn load_config_file(path: &Path) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let mut content = fs::read_to_string(path)?;
    json_strip_comments::strip(&mut content)?;
    let config: FileConfig = serde_json::from_str(&content)?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load config file
    let file_config = if let Some(config_path) = &cli.config {
        // Use specified config file (error if not found)
        if !config_path.exists() {
            eprintln!("Error: Config file not found: {}", config_path.display());
            std::process::exit(1);
        }
        Some(load_config_file(config_path)?)
    } else {
        // Look for default config file in the project root
        match find_default_config(&cli.project_root) {
            Some(path) => match load_config_file(&path) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file '{}': {}", path.display(), e);
                    None
                }
            },
            None => None,
        }
    };

    // Environment: CLI flag > config file > LESSKIT_ENV > production
    let environment_name = cli
        .environment
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.environment.clone()))
        .or_else(|| std::env::var("LESSKIT_ENV").ok())
        .unwrap_or_else(|| "production".to_string());
    let environment = Environment::from_name(&environment_name);

    let project_root = cli.project_root.canonicalize()?;
    let mut config = Config::for_environment(environment, &project_root);

    // Merge overrides: file config first, CLI flags win
    if let Some(ref cfg) = file_config {
        if let Some(v) = cfg.compression {
            config.compression = v;
        }
        if let Some(v) = cfg.header {
            config.header = v;
        }
        if let Some(ref v) = cfg.destination_path {
            config.destination_path = v.clone();
        }
        if let Some(v) = cfg.cache_enabled {
            config.cache_enabled = v;
        }
    }
    if let Some(v) = cli.compression {
        config.compression = v;
    }
    if let Some(v) = cli.header {
        config.header = v;
    }
    if let Some(ref v) = cli.destination_path {
        config.destination_path = v.clone();
    }
    if let Some(v) = cli.cache {
        config.cache_enabled = v;
    }

    let roots: Vec<PathBuf> = if !cli.root.is_empty() {
        cli.root.clone()
    } else if let Some(ref cfg) = file_config {
        cfg.roots.clone()
    } else {
        Vec::new()
    };

    if roots.is_empty() {
        eprintln!("Error: No source roots specified. Use --root or provide a config file.");
        std::process::exit(1);
    }

    let mut engine = match Stylesheets::new(config).with_builtin_compilers() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    for root in roots {
        // Relative roots resolve against the project root
        let root = if root.is_absolute() { root } else { project_root.join(root) };
        engine.add_root(root);
    }

    match cli.command {
        Command::Parse => engine.parse_all()?,
        Command::Clean => engine.clean_all()?,
        Command::Generate { key } => match engine.generate(&parse_key(&key)) {
            Ok(text) => println!("{text}"),
            Err(LesskitError::SourceNotFound(key)) => {
                eprintln!("Error: no stylesheet source found for key: {}", key.join("/"));
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        Command::Exists { key } => {
            if engine.exists(&parse_key(&key)) {
                println!("yes");
            } else {
                println!("no");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
