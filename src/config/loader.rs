use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::FactorygenConfig;
use crate::emit::is_identifier;
use crate::errors::{FactoryGenError, Result};

pub const CONFIG_FILE_NAME: &str = ".factorygen.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> std::result::Result<FactorygenConfig, String> {
    let config = toml::from_str::<FactorygenConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))?;

    for factory in &config.factories {
        if !is_identifier(&factory.discriminator) {
            return Err(format!(
                "discriminator `{}` of the {} factory is not a valid identifier",
                factory.discriminator, factory.base.name
            ));
        }
        if factory.base.name.is_empty() {
            return Err(format!(
                "[[factory]] writing {} names no base class",
                factory.output.display()
            ));
        }
    }
    if config.extensions.as_ref().is_some_and(Vec::is_empty) {
        return Err("`extensions` must name at least one extension".to_string());
    }

    Ok(config)
}

/// Load a configuration file and resolve its relative paths against the
/// file's directory.
pub fn load_config_from(path: &Path) -> Result<FactorygenConfig> {
    let contents = read_config_file(path).map_err(|e| FactoryGenError::io(path, e))?;
    let config = parse_and_validate_config(&contents).map_err(FactoryGenError::Config)?;
    log::debug!("Loaded config from {}", path.display());

    let dir = crate::io::paths::normalize(path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(config.resolve_relative_to(&dir))
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Nearest `.factorygen.toml` at or above `start`.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    directory_ancestors(crate::io::paths::normalize(start), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file())
}

/// Load the explicitly named config, or the nearest one above `start`.
/// Returns the path it came from alongside the configuration.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<Option<(PathBuf, FactorygenConfig)>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match discover_config(start) {
            Some(path) => path,
            None => {
                log::debug!(
                    "No config found after checking {} directories",
                    MAX_TRAVERSAL_DEPTH
                );
                return Ok(None);
            }
        },
    };
    let config = load_config_from(&path)?;
    Ok(Some((path, config)))
}
