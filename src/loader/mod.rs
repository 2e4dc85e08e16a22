//! Loading compiled modules and describing what they export.
//!
//! A loaded class is represented by a [`ClassInfo`] handle shared through an
//! `Arc`. Each `load`/`reload` call builds fresh handles, so records taken from
//! an earlier load are never updated in place and have to be invalidated by
//! their source file instead. Inheritance is checked on declaration identity
//! ([`TypeId`]), which stays stable across reloads.

pub mod extract;
pub mod parser;
pub mod resolve;

use crate::location::SourceLocation;
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub use resolve::TreeSitterLoader;

/// Declaration identity of a class: the module that declares it and the
/// binding it is declared under (`default` for anonymous default exports).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    pub module: PathBuf,
    pub name: String,
}

impl TypeId {
    pub fn new(module: &Path, name: impl Into<String>) -> Self {
        Self {
            module: crate::io::paths::normalize(module),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.module.display(), self.name)
    }
}

/// Value of a static class member, as far as it can be known statically.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticValue {
    String(String),
    /// Numeric literal, kept as written.
    Number(String),
    Boolean(bool),
    Null,
    Undefined,
    /// Anything else, kept as source text.
    Expression(String),
}

impl StaticValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StaticValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StaticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticValue::String(s) => write!(f, "{}", s),
            StaticValue::Number(n) => write!(f, "{}", n),
            StaticValue::Boolean(b) => write!(f, "{}", b),
            StaticValue::Null => write!(f, "null"),
            StaticValue::Undefined => write!(f, "undefined"),
            StaticValue::Expression(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Superclass {
    Resolved(Arc<ClassInfo>),
    /// `extends` something that could not be followed to a class declaration
    /// (a package import, a global, a call expression).
    Unresolved { name: String },
}

impl Superclass {
    pub fn name(&self) -> &str {
        match self {
            Superclass::Resolved(class) => &class.name,
            Superclass::Unresolved { name } => name,
        }
    }

    pub fn class(&self) -> Option<&Arc<ClassInfo>> {
        match self {
            Superclass::Resolved(class) => Some(class),
            Superclass::Unresolved { .. } => None,
        }
    }
}

/// Handle to a class exported by a loaded module.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub id: TypeId,
    /// Runtime `name` of the class.
    pub name: String,
    /// Declared `abstract` (only visible in TypeScript sources).
    pub is_abstract: bool,
    pub statics: IndexMap<String, StaticValue>,
    pub superclass: Option<Superclass>,
    /// Position of the declaration in the loaded (compiled) file.
    pub position: Option<SourceLocation>,
    pub source_mapping_url: Option<String>,
}

impl ClassInfo {
    pub fn new(id: TypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_abstract: false,
            statics: IndexMap::new(),
            superclass: None,
            position: None,
            source_mapping_url: None,
        }
    }

    /// Superclass chain, nearest first. Stops at the first unresolved link.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.superclass.as_ref(),
        }
    }

    /// Static member lookup following the superclass chain, the way a
    /// constructor's statics are inherited at runtime.
    pub fn static_value(&self, property: &str) -> Option<&StaticValue> {
        if let Some(value) = self.statics.get(property) {
            return Some(value);
        }
        self.ancestors()
            .filter_map(Superclass::class)
            .find_map(|class| class.statics.get(property))
    }

    /// True is-a check: some resolved ancestor *is* `base`.
    pub fn is_subtype_of(&self, base: &TypeId) -> bool {
        self.ancestors()
            .filter_map(Superclass::class)
            .any(|class| &class.id == base)
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a Superclass>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Superclass;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.class().and_then(|c| c.superclass.as_ref());
        Some(current)
    }
}

#[derive(Debug, Clone)]
pub enum ExportKind {
    Class(Arc<ClassInfo>),
    /// A plain function; constructible at runtime but has no class chain.
    Function,
    Value,
}

#[derive(Debug, Clone)]
pub struct ExportedBinding {
    pub name: String,
    pub kind: ExportKind,
}

/// Exported bindings of one module, in declaration order.
#[derive(Debug, Clone)]
pub struct ModuleExports {
    pub path: PathBuf,
    pub exports: Vec<ExportedBinding>,
}

impl ModuleExports {
    pub fn get(&self, name: &str) -> Option<&ExportedBinding> {
        self.exports.iter().find(|e| e.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        match self.get(name).map(|e| &e.kind) {
            Some(ExportKind::Class(class)) => Some(class),
            _ => None,
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, &Arc<ClassInfo>)> {
        self.exports.iter().filter_map(|e| match &e.kind {
            ExportKind::Class(class) => Some((e.name.as_str(), class)),
            _ => None,
        })
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {path} at {line}:{column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("could not parse {path}: {message}")]
    Parser { path: PathBuf, message: String },

    #[error("cannot resolve `{specifier}` imported by {importer}")]
    Unresolvable { importer: PathBuf, specifier: String },
}

/// `load(path) -> exports | failure`, with an explicit cache-bypassing
/// `reload` for files known to have changed.
pub trait ModuleLoader {
    fn load(&mut self, path: &Path) -> Result<ModuleExports, LoadError>;

    fn reload(&mut self, path: &Path) -> Result<ModuleExports, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(module: &str, name: &str, superclass: Option<Superclass>) -> Arc<ClassInfo> {
        let mut info = ClassInfo::new(TypeId::new(Path::new(module), name), name);
        info.superclass = superclass;
        Arc::new(info)
    }

    #[test]
    fn test_is_subtype_of_follows_chain() {
        let shape = class("/p/shape.js", "Shape", None);
        let round = class(
            "/p/round.js",
            "Round",
            Some(Superclass::Resolved(shape.clone())),
        );
        let circle = class("/p/circle.js", "Circle", Some(Superclass::Resolved(round)));

        assert!(circle.is_subtype_of(&shape.id));
        assert!(!shape.is_subtype_of(&shape.id));
        assert_eq!(
            circle.ancestors().map(Superclass::name).collect::<Vec<_>>(),
            vec!["Round", "Shape"]
        );
    }

    #[test]
    fn test_static_value_is_inherited() {
        let mut base = ClassInfo::new(TypeId::new(Path::new("/p/a.js"), "A"), "A");
        base.statics
            .insert("typeName".into(), StaticValue::String("a".into()));
        let child = class(
            "/p/b.js",
            "B",
            Some(Superclass::Resolved(Arc::new(base))),
        );

        assert_eq!(
            child.static_value("typeName").and_then(StaticValue::as_str),
            Some("a")
        );
        assert!(child.static_value("missing").is_none());
    }

    #[test]
    fn test_unresolved_superclass_ends_chain() {
        let child = class(
            "/p/b.js",
            "B",
            Some(Superclass::Unresolved {
                name: "Shape".into(),
            }),
        );
        let names: Vec<_> = child.ancestors().map(Superclass::name).collect();
        assert_eq!(names, vec!["Shape"]);
        assert!(!child.is_subtype_of(&TypeId::new(Path::new("/p/shape.js"), "Shape")));
    }
}
