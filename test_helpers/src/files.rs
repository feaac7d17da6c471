//! Temporary configuration files for tests.
//!
//! # Examples
//!
//! ```
//! use propbind_test_helpers::files::ConfigDir;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = ConfigDir::new()?;
//! let path = dir.write("app.toml", "port = 8080\n")?;
//! assert!(path.as_str().ends_with("app.toml"));
//! # Ok(())
//! # }
//! ```

use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A temporary directory removed on drop.
#[derive(Debug)]
pub struct ConfigDir {
    dir: TempDir,
    root: Utf8PathBuf,
}

impl ConfigDir {
    /// Create an empty directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is
    /// not valid UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temporary config dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temporary dir is not UTF-8: {}", path.display()))?;
        Ok(Self { dir, root })
    }

    /// Root of the directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the file cannot be written.
    pub fn write(&self, relative: impl AsRef<Utf8Path>, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Close the directory, surfacing removal errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn close(self) -> Result<()> {
        self.dir.close().context("remove temporary config dir")
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigDir;
    use anyhow::{Result, ensure};

    #[test]
    fn write_creates_nested_files() -> Result<()> {
        let dir = ConfigDir::new()?;
        let path = dir.write("nested/app.properties", "a=1\n")?;
        ensure!(path.starts_with(dir.path()));
        ensure!(std::fs::read_to_string(&path)? == "a=1\n");
        dir.close()
    }
}
