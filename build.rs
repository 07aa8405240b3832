use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    // Askama templates and sqlx migrations are embedded at compile time;
    // cargo does not track them without explicit hints.
    rerun_if_changed_dir("templates", "html");
    rerun_if_changed_dir("migrations", "sql");
}

fn rerun_if_changed_dir(dir: impl AsRef<Path>, extension: &str) {
    let dir = dir.as_ref();
    if !dir.exists() {
        return;
    }
    println!("cargo:rerun-if-changed={}", dir.display());
    let mut stack: Vec<PathBuf> = vec![dir.to_path_buf()];
    while let Some(path) = stack.pop() {
        let Ok(entries) = fs::read_dir(&path) else {
            continue;
        };
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                stack.push(p);
                continue;
            }
            if p.extension().and_then(|s| s.to_str()) == Some(extension) {
                println!("cargo:rerun-if-changed={}", p.display());
            }
        }
    }
}
