// src/ingest/snapshot.rs
//! JSON snapshot of the last successful fetch. Written for inspection only; nothing
//! reads it back for recovery.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::ingest::types::NewsItem;

/// Overwrite `path` with `items` as a pretty JSON array (temp file + rename).
pub fn write_snapshot(path: &Path, items: &[NewsItem]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(items).context("serializing snapshot")?;
    let tmp = path.with_extension("json.tmp");
    let written = write_then_rename(&tmp, path, json.as_bytes());
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = fs::File::create(tmp).with_context(|| format!("creating {}", tmp.display()))?;
    f.write_all(bytes).with_context(|| format!("writing {}", tmp.display()))?;
    f.sync_all()?;
    fs::rename(tmp, path).with_context(|| format!("replacing {}", path.display()))
}

/// Items from the last snapshot, for diagnostics.
pub fn read_snapshot(path: &Path) -> Result<Vec<NewsItem>> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing snapshot {}", path.display()))
}
