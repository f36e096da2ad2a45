use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use glance_core::Snapshot;

pub fn glance_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".glance"))
}

pub fn ensure_glance_home() -> Result<PathBuf> {
    let dir = glance_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn snapshot_path() -> Result<PathBuf> {
    Ok(ensure_glance_home()?.join("state.json"))
}

/// Load the entity snapshot, empty if none has been written yet.
pub fn load_snapshot() -> Result<Snapshot> {
    let p = snapshot_path()?;
    if !p.exists() {
        return Ok(Snapshot::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_snapshot(snapshot: &Snapshot) -> Result<()> {
    let p = snapshot_path()?;
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
