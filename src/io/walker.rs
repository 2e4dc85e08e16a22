use crate::errors::{FactoryGenError, Result};
use crate::io::paths;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions of compiled modules considered by default.
pub const DEFAULT_MODULE_EXTENSIONS: &[&str] = &["js", "mjs"];

/// Recursive, sorted walk over a source root collecting module files.
///
/// Ignore roots are not applied here: an ignored file still has to be
/// *considered* so that any specialisations it previously contributed are
/// invalidated. The orchestrator decides whether to load it.
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: DEFAULT_MODULE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        if !extensions.is_empty() {
            self.extensions = extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect();
        }
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root).sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| FactoryGenError::Walk {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            let path = entry.path();

            if entry.file_type().is_file() && self.should_process(path) {
                files.push(paths::normalize(path));
            }
        }

        Ok(files)
    }

    pub fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext.as_ref()))
    }
}

pub fn find_module_files(root: &Path, extensions: Vec<String>) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_extensions(extensions)
        .walk()
}
