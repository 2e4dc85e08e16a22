use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::registry::{CollisionPolicy, DEFAULT_DISCRIMINATOR};

/// Root configuration structure for factorygen
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FactorygenConfig {
    /// Directory scanned for compiled modules
    #[serde(default)]
    pub source_root: Option<PathBuf>,

    /// Directories whose contents are never considered
    #[serde(default)]
    pub ignore_paths: Vec<PathBuf>,

    /// Script that drives generation; skipped during scans
    #[serde(default)]
    pub generator_module: Option<PathBuf>,

    /// Module file extensions to scan, without the leading dot
    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    #[serde(default, rename = "import_rewrite")]
    pub import_rewrites: Vec<ImportRewriteConfig>,

    #[serde(default, rename = "factory")]
    pub factories: Vec<FactoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportRewriteConfig {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// One `[[factory]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryConfig {
    pub base: BaseConfig,

    /// Generated module path
    pub output: PathBuf,

    #[serde(default = "default_discriminator")]
    pub discriminator: String,

    #[serde(default)]
    pub collision: CollisionPolicy,
}

/// Where the base class is exported from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseConfig {
    pub module: PathBuf,
    pub name: String,
}

pub fn default_discriminator() -> String {
    DEFAULT_DISCRIMINATOR.to_string()
}

impl FactorygenConfig {
    /// Rebase every relative path onto `dir`, the directory holding the
    /// configuration file.
    pub fn resolve_relative_to(mut self, dir: &Path) -> Self {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        };
        if let Some(root) = self.source_root.as_mut() {
            rebase(root);
        }
        for path in &mut self.ignore_paths {
            rebase(path);
        }
        if let Some(module) = self.generator_module.as_mut() {
            rebase(module);
        }
        for rewrite in &mut self.import_rewrites {
            rebase(&mut rewrite.from);
            rebase(&mut rewrite.to);
        }
        for factory in &mut self.factories {
            rebase(&mut factory.base.module);
            rebase(&mut factory.output);
        }
        self
    }

    pub fn module_extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(extensions) => extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            None => crate::io::DEFAULT_MODULE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}
