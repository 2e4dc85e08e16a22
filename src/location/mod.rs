//! Mapping class handles back to human-readable source positions.
//!
//! Used for diagnostics, for the traceability banner of generated files and to
//! find the origin file of a base type. Every consumer treats a failed lookup
//! as "unknown location" rather than an error worth aborting for.

pub mod sourcemap;

use crate::loader::ClassInfo;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use sourcemap::{find_source_map, sibling_map_sources, SourceMap};

/// A position in a file; line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no source position recorded for class `{class}`")]
    MissingPosition { class: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid source map {path}: {message}")]
    InvalidSourceMap { path: PathBuf, message: String },
}

/// Best-effort `handle -> {file, line, column}` capability.
pub trait LocationResolver {
    fn locate(&self, class: &ClassInfo) -> Result<SourceLocation, LocateError>;
}

/// Resolves the compiled declaration position and translates it through the
/// module's source map when one is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceMapResolver;

impl SourceMapResolver {
    pub fn new() -> Self {
        Self
    }
}

impl LocationResolver for SourceMapResolver {
    fn locate(&self, class: &ClassInfo) -> Result<SourceLocation, LocateError> {
        let compiled = class
            .position
            .as_ref()
            .ok_or_else(|| LocateError::MissingPosition {
                class: class.name.clone(),
            })?;

        let Some(map_path) = find_source_map(&compiled.file, class.source_mapping_url.as_deref())
        else {
            return Ok(compiled.clone());
        };

        let map = SourceMap::from_file(&map_path)?;
        let line = compiled.line.saturating_sub(1) as u32;
        let column = compiled.column.saturating_sub(1) as u32;
        match map.original_position_for(line, column) {
            Some((file, line, column)) => Ok(SourceLocation::new(
                file,
                line as usize + 1,
                column as usize + 1,
            )),
            None => {
                log::debug!(
                    "{} has no mapping for {}, using compiled position",
                    map_path.display(),
                    compiled
                );
                Ok(compiled.clone())
            }
        }
    }
}

/// Locate `class`, degrading to `None` and a debug log on failure.
pub fn try_locate(resolver: &dyn LocationResolver, class: &ClassInfo) -> Option<SourceLocation> {
    match resolver.locate(class) {
        Ok(location) => Some(location),
        Err(e) => {
            log::debug!("could not locate `{}`: {}", class.name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ClassInfo, TypeId};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn class_at(file: &Path, line: usize, column: usize) -> ClassInfo {
        let mut class = ClassInfo::new(TypeId::new(file, "Circle"), "Circle");
        class.position = Some(SourceLocation::new(file.to_path_buf(), line, column));
        class
    }

    #[test]
    fn test_without_source_map_returns_compiled_position() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("circle.js");
        fs::write(&file, "export class Circle {}").unwrap();

        let location = SourceMapResolver.locate(&class_at(&file, 1, 8)).unwrap();
        assert_eq!(location, SourceLocation::new(file, 1, 8));
    }

    #[test]
    fn test_sibling_source_map_is_followed() {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(&dist).unwrap();
        let file = dist.join("circle.js");
        fs::write(&file, "import x from './x.js';\nexport class Circle {}").unwrap();
        fs::write(
            dist.join("circle.js.map"),
            r#"{"version":3,"sources":["../src/circle.ts"],"mappings":"AAAA;AAEA,MAAa"}"#,
        )
        .unwrap();

        let location = SourceMapResolver.locate(&class_at(&file, 2, 8)).unwrap();
        assert_eq!(location.file, crate::io::paths::normalize(&dir.path().join("src/circle.ts")));
        assert_eq!((location.line, location.column), (3, 14));
    }

    #[test]
    fn test_missing_position_is_an_error() {
        let class = ClassInfo::new(TypeId::new(Path::new("/p/a.js"), "A"), "A");
        assert!(matches!(
            SourceMapResolver.locate(&class),
            Err(LocateError::MissingPosition { .. })
        ));
        assert!(try_locate(&SourceMapResolver, &class).is_none());
    }
}
