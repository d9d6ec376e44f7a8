use std::path::{Path, PathBuf};

const MARKER: &str = "assets/voxels/blocks.toml";

pub fn resolve_assets_root(cli: Option<PathBuf>) -> PathBuf {
    // CLI flag, then STRATA_ASSETS, then nearby dirs, then CWD
    if let Some(pb) = cli {
        if pb.exists() {
            return pb;
        }
    }
    if let Ok(p) = std::env::var("STRATA_ASSETS") {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return pb;
        }
    }
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.to_path_buf());
        }
    }
    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));

    for base in candidates {
        let mut cur = base.clone();
        for _ in 0..5 {
            if cur.join(MARKER).exists() {
                return cur;
            }
            if let Some(parent) = cur.parent() {
                cur = parent.to_path_buf();
            } else {
                break;
            }
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn blocks_path(root: &Path) -> PathBuf {
    root.join(MARKER)
}

pub fn worldgen_path(root: &Path) -> PathBuf {
    root.join("assets/voxels/worldgen.toml")
}

pub fn world_path(root: &Path) -> PathBuf {
    root.join("assets/voxels/world.toml")
}
