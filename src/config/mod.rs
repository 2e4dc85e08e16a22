//! `.factorygen.toml` configuration.

mod core;
mod loader;

pub use core::{default_discriminator, BaseConfig, FactoryConfig, FactorygenConfig, ImportRewriteConfig};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
