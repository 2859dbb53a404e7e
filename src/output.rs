// src/output.rs

use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Write `bytes` to `path` atomically: into a temp file beside it, then rename over.
///
/// A failure at any point leaves nothing under `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir: PathBuf = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating {:?}", dir))?;

    let mut tmp =
        NamedTempFile::new_in(&dir).with_context(|| format!("creating temp file in {:?}", dir))?;
    tmp.write_all(bytes)
        .with_context(|| format!("writing temp file for {:?}", path))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("syncing temp file for {:?}", path))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("renaming temp file -> {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_replaces() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("nested").join("out.txt");

        write_atomic(&path, b"first")?;
        write_atomic(&path, b"second")?;

        assert_eq!(fs::read_to_string(&path)?, "second");
        let leftovers = fs::read_dir(path.parent().unwrap())?.count();
        assert_eq!(leftovers, 1, "temp file left behind");
        Ok(())
    }
}
