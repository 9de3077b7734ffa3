use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lesskit")]
#[command(about = "Compile LESS stylesheet trees into CSS with an mtime-based cache")]
pub struct Cli {
    /// Path to config file (lesskit.json or lesskit.jsonc)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Project root directory
    #[arg(short = 'C', long, default_value = ".")]
    pub project_root: PathBuf,

    /// Source root directories, searched in order
    #[arg(short, long)]
    pub root: Vec<PathBuf>,

    /// Environment name (production, development, test) [default: production]
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Force newline compression on or off
    #[arg(long)]
    pub compression: Option<bool>,

    /// Force the header banner on or off
    #[arg(long)]
    pub header: Option<bool>,

    /// Subdirectory of public/ receiving derived stylesheets
    #[arg(long)]
    pub destination_path: Option<String>,

    /// Force the on-disk cache on or off
    #[arg(long)]
    pub cache: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Regenerate every stylesheet and refresh the public tree
    Parse,
    /// Delete every derived stylesheet from the public tree
    Clean,
    /// Generate a single stylesheet and print it (e.g. `generate admin/screen`)
    Generate { key: String },
    /// Report whether a stylesheet source backs the given key
    Exists { key: String },
}
