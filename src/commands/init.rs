use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# factorygen configuration
#
# Paths are relative to this file.

# Directory holding the compiled modules to scan
source_root = "dist"

# Directories never scanned for specialisations
ignore_paths = ["node_modules"]

# Script that configures generation; never scanned
# generator_module = "dist/generate.js"

# Module extensions to scan
extensions = ["js", "mjs"]

# Import specialisations from the source tree instead of the compiled one
# [[import_rewrite]]
# from = "dist"
# to = "src"

[[factory]]
base = { module = "dist/shape.js", name = "Shape" }
output = "src/ShapeFactory.ts"
discriminator = "typeName"
# last-wins, first-wins or fail
collision = "last-wins"
"#;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = init_config_in(Path::new("."), force)?;
    println!("Created {} configuration file", config_path.display());
    Ok(())
}

/// Write the starter configuration into `dir`, returning its path.
pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}
