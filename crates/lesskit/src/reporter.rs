use std::path::Path;

/// Per-file notice for a refreshed public artifact.
pub fn notice_written(path: &Path) {
    println!("wrote {}", path.display());
}

/// Per-file notice for a deleted public artifact.
pub fn notice_removed(path: &Path) {
    println!("removed {}", path.display());
}

/// Cache persistence is best-effort; a failed write is reported, the
/// generated text is still served.
pub fn warn_persist(path: &Path, error: &std::io::Error) {
    eprintln!("warning: could not cache {}: {error}", path.display());
}
