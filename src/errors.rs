//! Error types for factory generation.
//!
//! Only failures that must abort an operation are represented here: I/O on
//! generated files, emitter failures, configuration problems and misuse of the
//! orchestrator. Data-quality problems found while scanning (unloadable
//! modules, duplicate discriminators, suspicious inheritance) are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead and never surface
//! as an `Err`.

use std::path::PathBuf;
use thiserror::Error;

use crate::emit::EmitError;
use crate::loader::LoadError;
use crate::orchestrator::RegistryId;

pub type Result<T> = std::result::Result<T, FactoryGenError>;

#[derive(Debug, Error)]
pub enum FactoryGenError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("{0} is not declared on this builder")]
    UnknownRegistry(RegistryId),

    /// `run` was invoked on an orchestrator that is already running.
    #[error("factory generation is already running for this builder")]
    AlreadyRunning,

    #[error("{module} does not export a class named `{name}`")]
    UnknownBase { module: PathBuf, name: String },

    #[error("duplicate value `{value}` for `{property}` in {base} factory: {sources}")]
    DuplicateDiscriminator {
        base: String,
        property: String,
        value: String,
        sources: String,
    },
}

impl FactoryGenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
