pub mod paths;
pub mod walker;

pub use walker::{find_module_files, FileWalker, DEFAULT_MODULE_EXTENSIONS};

use crate::errors::{FactoryGenError, Result};
use std::fs;
use std::path::Path;

/// Overwrite `path` with `content`, creating missing parent directories.
///
/// The write is not atomic: an interrupted process can leave a truncated file.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|e| FactoryGenError::io(path, e))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path).map_err(|e| FactoryGenError::io(path, e))?;
    }
    Ok(())
}
