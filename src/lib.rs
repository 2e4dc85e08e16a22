// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod errors;
pub mod formatting;
pub mod io;
pub mod loader;
pub mod location;
pub mod orchestrator;
pub mod registry;

// Re-export commonly used types
pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
pub use crate::emit::{CodeEmitter, EmissionPlan, TypeScriptEmitter};
pub use crate::errors::{FactoryGenError, Result};
pub use crate::loader::{
    ClassInfo, ExportKind, ModuleExports, ModuleLoader, StaticValue, Superclass, TreeSitterLoader,
    TypeId,
};
pub use crate::location::{LocationResolver, SourceLocation, SourceMapResolver};
pub use crate::orchestrator::{FactoriesBuilder, RegistryId};
pub use crate::registry::{
    unique_identifier, CollisionPolicy, FactoryBuilder, ImportRewrite, Specialisation,
};
