//! CLI command implementations.
//!
//! - **generate**: scan compiled modules and write every configured factory
//! - **init**: write a starter `.factorygen.toml`

pub mod generate;
pub mod init;

pub use generate::{build_factories, handle_generate, GenerateConfig};
pub use init::init_config;
