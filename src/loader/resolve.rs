//! Tree-sitter backed [`ModuleLoader`].
//!
//! Parsed modules are cached by path and modification time. Class handles are
//! rebuilt for every `load`/`reload` call by following `extends` clauses
//! through imports, re-exports and namespace imports.

use super::extract::{extract_module, ExportTarget, Heritage, Imported, LocalBinding, ParsedModule};
use super::parser::{detect_variant, parse_source};
use super::{
    ClassInfo, ExportKind, ExportedBinding, LoadError, ModuleExports, ModuleLoader, Superclass,
    TypeId,
};
use crate::io::paths;
use crate::location::SourceLocation;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Extensions tried, in order, for extensionless relative specifiers.
const RESOLVE_EXTENSIONS: &[&str] = &["js", "mjs", "ts", "mts"];

/// Longest `extends`/re-export chain followed before giving up.
const MAX_RESOLUTION_DEPTH: usize = 64;

struct CachedModule {
    modified: Option<SystemTime>,
    module: Arc<ParsedModule>,
}

#[derive(Default)]
pub struct TreeSitterLoader {
    cache: HashMap<PathBuf, CachedModule>,
}

impl TreeSitterLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached parse of `path`.
    pub fn evict(&mut self, path: &Path) -> bool {
        self.cache.remove(&paths::normalize(path)).is_some()
    }

    pub fn cached_modules(&self) -> usize {
        self.cache.len()
    }

    fn parsed(&mut self, path: &Path) -> Result<Arc<ParsedModule>, LoadError> {
        let path = paths::normalize(path);
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;

        if let Some(cached) = self.cache.get(&path) {
            if cached.modified == Some(modified) {
                return Ok(cached.module.clone());
            }
        }

        log::debug!("parsing {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_source(&content, &path, detect_variant(&path))?;
        let module = Arc::new(extract_module(&parsed));
        self.cache.insert(
            path,
            CachedModule {
                modified: Some(modified),
                module: module.clone(),
            },
        );
        Ok(module)
    }

    fn exports_of(&mut self, path: &Path) -> Result<ModuleExports, LoadError> {
        let path = paths::normalize(path);
        let mut session = Session::default();
        let module = self.parsed(&path)?;

        let mut exports = Vec::new();
        let mut seen = HashSet::new();
        for entry in &module.exports {
            if !seen.insert(entry.exported.clone()) {
                continue;
            }
            let kind = self
                .resolve_target(&module, &entry.target, &mut session, 0)?
                .unwrap_or(ExportKind::Value);
            exports.push(ExportedBinding {
                name: entry.exported.clone(),
                kind,
            });
        }

        for specifier in &module.star_exports {
            let Some(target) = resolve_specifier(&path, specifier) else {
                continue;
            };
            for name in self.star_export_names(&target, &mut HashSet::new())? {
                if name == "default" || !seen.insert(name.clone()) {
                    continue;
                }
                let kind = self
                    .resolve_export(&target, &name, &mut session, 1)?
                    .unwrap_or(ExportKind::Value);
                exports.push(ExportedBinding { name, kind });
            }
        }

        Ok(ModuleExports { path, exports })
    }

    /// Names exported by a module, following nested `export *`.
    fn star_export_names(
        &mut self,
        path: &Path,
        visiting: &mut HashSet<PathBuf>,
    ) -> Result<Vec<String>, LoadError> {
        if !visiting.insert(path.to_path_buf()) {
            return Ok(Vec::new());
        }
        let module = self.parsed(path)?;
        let mut names: Vec<String> = module.exports.iter().map(|e| e.exported.clone()).collect();
        for specifier in &module.star_exports {
            if let Some(target) = resolve_specifier(path, specifier) {
                names.extend(self.star_export_names(&target, visiting)?);
            }
        }
        Ok(names)
    }

    fn resolve_target(
        &mut self,
        module: &Arc<ParsedModule>,
        target: &ExportTarget,
        session: &mut Session,
        depth: usize,
    ) -> Result<Option<ExportKind>, LoadError> {
        match target {
            ExportTarget::Local(name) => self.resolve_local(module, name, session, depth),
            ExportTarget::Class(index) => Ok(Some(ExportKind::Class(
                self.class_info(module, *index, session, depth)?,
            ))),
            ExportTarget::Function => Ok(Some(ExportKind::Function)),
            ExportTarget::Value => Ok(Some(ExportKind::Value)),
            ExportTarget::ReExport {
                specifier,
                imported,
            } => self.resolve_import(&module.path, specifier, imported, session, depth),
        }
    }

    fn resolve_local(
        &mut self,
        module: &Arc<ParsedModule>,
        name: &str,
        session: &mut Session,
        depth: usize,
    ) -> Result<Option<ExportKind>, LoadError> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Ok(None);
        }
        if let Some(binding) = module.bindings.get(name) {
            return Ok(Some(match binding {
                LocalBinding::Class(index) => {
                    ExportKind::Class(self.class_info(module, *index, session, depth)?)
                }
                LocalBinding::Function => ExportKind::Function,
                LocalBinding::Value => ExportKind::Value,
            }));
        }
        match module.imports.get(name) {
            Some(import) => {
                let import = import.clone();
                self.resolve_import(
                    &module.path,
                    &import.specifier,
                    &import.imported,
                    session,
                    depth,
                )
            }
            None => Ok(None),
        }
    }

    fn resolve_import(
        &mut self,
        importer: &Path,
        specifier: &str,
        imported: &Imported,
        session: &mut Session,
        depth: usize,
    ) -> Result<Option<ExportKind>, LoadError> {
        let Some(target) = resolve_specifier(importer, specifier) else {
            if is_relative(specifier) {
                return Err(LoadError::Unresolvable {
                    importer: importer.to_path_buf(),
                    specifier: specifier.to_string(),
                });
            }
            // package imports are opaque
            return Ok(None);
        };
        match imported {
            Imported::Named(name) => self.resolve_export(&target, name, session, depth + 1),
            Imported::Default => self.resolve_export(&target, "default", session, depth + 1),
            Imported::Namespace => Ok(Some(ExportKind::Value)),
        }
    }

    fn resolve_export(
        &mut self,
        path: &Path,
        name: &str,
        session: &mut Session,
        depth: usize,
    ) -> Result<Option<ExportKind>, LoadError> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Ok(None);
        }
        let key = (paths::normalize(path), name.to_string());
        if !session.resolving.insert(key.clone()) {
            return Ok(None);
        }
        let result = self.resolve_export_uncached(path, name, session, depth);
        session.resolving.remove(&key);
        result
    }

    fn resolve_export_uncached(
        &mut self,
        path: &Path,
        name: &str,
        session: &mut Session,
        depth: usize,
    ) -> Result<Option<ExportKind>, LoadError> {
        let module = self.parsed(path)?;
        if let Some(entry) = module.export(name) {
            let target = entry.target.clone();
            return self.resolve_target(&module, &target, session, depth);
        }
        if name == "default" {
            return Ok(None);
        }
        for specifier in &module.star_exports {
            if let Some(target) = resolve_specifier(&module.path, specifier) {
                if let Some(kind) = self.resolve_export(&target, name, session, depth + 1)? {
                    return Ok(Some(kind));
                }
            }
        }
        Ok(None)
    }

    fn class_info(
        &mut self,
        module: &Arc<ParsedModule>,
        index: usize,
        session: &mut Session,
        depth: usize,
    ) -> Result<Arc<ClassInfo>, LoadError> {
        let key = (module.path.clone(), index);
        if let Some(done) = session.classes.get(&key) {
            return Ok(done.clone());
        }

        let decl = &module.classes[index];
        let binding = decl.binding.clone().unwrap_or_else(|| "default".to_string());
        let mut info = ClassInfo::new(TypeId::new(&module.path, binding), decl.name.clone());
        info.is_abstract = decl.is_abstract;
        info.statics = decl.statics.clone();
        info.position = Some(SourceLocation::new(
            module.path.clone(),
            decl.line,
            decl.column,
        ));
        info.source_mapping_url = module.source_mapping_url.clone();

        if session.building.insert(key.clone()) {
            info.superclass = match decl.heritage.clone() {
                Some(heritage) => Some(self.superclass(module, &heritage, session, depth + 1)?),
                None => None,
            };
            session.building.remove(&key);
        } else {
            // `class A extends B`, `class B extends A`: not constructible, stop here
            log::debug!("inheritance cycle through {} in {}", decl.name, module.path.display());
        }

        let info = Arc::new(info);
        session.classes.insert(key, info.clone());
        Ok(info)
    }

    fn superclass(
        &mut self,
        module: &Arc<ParsedModule>,
        heritage: &Heritage,
        session: &mut Session,
        depth: usize,
    ) -> Result<Superclass, LoadError> {
        let (resolved, name) = match heritage {
            Heritage::Identifier(name) => (
                self.resolve_local(module, name, session, depth)?,
                name.clone(),
            ),
            Heritage::Member { object, property } => {
                let resolved = match module.imports.get(object) {
                    Some(import) if import.imported == Imported::Namespace => {
                        let specifier = import.specifier.clone();
                        match resolve_specifier(&module.path, &specifier) {
                            Some(target) => {
                                self.resolve_export(&target, property, session, depth + 1)?
                            }
                            None => None,
                        }
                    }
                    _ => None,
                };
                (resolved, property.clone())
            }
            Heritage::Expression(text) => (None, text.clone()),
        };

        Ok(match resolved {
            Some(ExportKind::Class(class)) => Superclass::Resolved(class),
            _ => Superclass::Unresolved { name },
        })
    }
}

impl ModuleLoader for TreeSitterLoader {
    fn load(&mut self, path: &Path) -> Result<ModuleExports, LoadError> {
        self.exports_of(path)
    }

    fn reload(&mut self, path: &Path) -> Result<ModuleExports, LoadError> {
        self.evict(path);
        self.exports_of(path)
    }
}

/// Per-call state: handles built so far and the resolution stack.
#[derive(Default)]
struct Session {
    classes: HashMap<(PathBuf, usize), Arc<ClassInfo>>,
    building: HashSet<(PathBuf, usize)>,
    resolving: HashSet<(PathBuf, String)>,
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// Resolve a relative or absolute specifier to an existing file.
pub fn resolve_specifier(importer: &Path, specifier: &str) -> Option<PathBuf> {
    if !is_relative(specifier) {
        return None;
    }
    let base = importer.parent().unwrap_or_else(|| Path::new(""));
    let candidate = paths::normalize(&base.join(specifier));

    if candidate.is_file() {
        return Some(candidate);
    }
    // TypeScript sources import their siblings with the runtime extension
    match candidate.extension().and_then(|e| e.to_str()) {
        Some("js") if candidate.with_extension("ts").is_file() => {
            return Some(candidate.with_extension("ts"));
        }
        Some("mjs") if candidate.with_extension("mts").is_file() => {
            return Some(candidate.with_extension("mts"));
        }
        _ => {}
    }
    for ext in RESOLVE_EXTENSIONS {
        let with_ext = PathBuf::from(format!("{}.{}", candidate.display(), ext));
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let index = candidate.join(format!("index.{}", ext));
        if index.is_file() {
            return Some(index);
        }
    }
    None
}
