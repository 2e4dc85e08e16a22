//! Discovery orchestration across every declared registry.
//!
//! [`FactoriesBuilder`] owns the registry set and the three collaborators
//! (loader, location resolver, emitter). `run` performs the initial scan and
//! generation; afterwards an external watcher can feed changed paths to
//! [`FactoriesBuilder::consider_file`] and regenerate what it reports.

pub mod classify;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::{CodeEmitter, TypeScriptEmitter};
use crate::errors::{FactoryGenError, Result};
use crate::io::{find_module_files, paths, DEFAULT_MODULE_EXTENSIONS};
use crate::loader::{ClassInfo, LoadError, ModuleLoader, Superclass, TreeSitterLoader};
use crate::location::{sibling_map_sources, try_locate, LocationResolver, SourceMapResolver};
use crate::registry::{CollisionPolicy, FactoryBuilder, Specialisation};
use classify::Classification;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const INITIAL_BUILD_REASON: &str = "Initial build";

/// Handle to a registry declared on a [`FactoriesBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryId(usize);

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registry #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    GeneratorModule,
    RegistryOutput,
    CompiledFromOutput,
    Ignored,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::GeneratorModule => "it is the generator module",
            SkipReason::RegistryOutput => "it is a generated factory",
            SkipReason::CompiledFromOutput => "it is compiled from a generated factory",
            SkipReason::Ignored => "it lies under an ignored path",
        };
        write!(f, "{}", text)
    }
}

pub struct FactoriesBuilder {
    loader: Box<dyn ModuleLoader>,
    resolver: Box<dyn LocationResolver>,
    emitter: Box<dyn CodeEmitter>,
    registries: Vec<FactoryBuilder>,
    generator_module: Option<PathBuf>,
    extensions: Vec<String>,
    running: bool,
    diagnostics: Diagnostics,
}

impl Default for FactoriesBuilder {
    fn default() -> Self {
        Self::new(
            Box::new(TreeSitterLoader::new()),
            Box::new(SourceMapResolver::new()),
            Box::new(TypeScriptEmitter::default()),
        )
    }
}

impl FactoriesBuilder {
    pub fn new(
        loader: Box<dyn ModuleLoader>,
        resolver: Box<dyn LocationResolver>,
        emitter: Box<dyn CodeEmitter>,
    ) -> Self {
        Self {
            loader,
            resolver,
            emitter,
            registries: Vec::new(),
            generator_module: None,
            extensions: DEFAULT_MODULE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            running: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Module that drives generation; it is never scanned for specialisations.
    pub fn with_generator_module(mut self, path: &Path) -> Self {
        self.generator_module = Some(paths::normalize(path));
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn declare(
        &mut self,
        base: Arc<ClassInfo>,
        output_file: &Path,
        discriminator: &str,
    ) -> RegistryId {
        self.declare_with_policy(base, output_file, discriminator, CollisionPolicy::default())
    }

    pub fn declare_with_policy(
        &mut self,
        base: Arc<ClassInfo>,
        output_file: &Path,
        discriminator: &str,
        policy: CollisionPolicy,
    ) -> RegistryId {
        self.declare_registry(FactoryBuilder::new(base, output_file, discriminator).with_policy(policy))
    }

    /// Declare a fully configured registry. A registry for the same base
    /// replaces the earlier one and keeps its id.
    pub fn declare_registry(&mut self, registry: FactoryBuilder) -> RegistryId {
        let base = registry.base().clone();
        if self.running {
            let message = format!(
                "{} factory was declared after generation started; files scanned so far are not reconsidered",
                base.name
            );
            log::debug!("{}", message);
            self.diagnostics.push(Diagnostic::warning(message));
        }

        if let Some(index) = self
            .registries
            .iter()
            .position(|existing| existing.base().id == base.id)
        {
            let message = format!(
                "{} factory was declared twice; {} replaces {}",
                base.name,
                registry.out_file().display(),
                self.registries[index].out_file().display()
            );
            log::debug!("{}", message);
            self.diagnostics.push(Diagnostic::warning(message));
            self.registries[index] = registry;
            return RegistryId(index);
        }

        log::debug!(
            "declared {} factory -> {}",
            base.name,
            registry.out_file().display()
        );
        self.registries.push(registry);
        RegistryId(self.registries.len() - 1)
    }

    /// Load the class exported as `export_name` from `module` through the
    /// configured loader.
    pub fn load_base(&mut self, module: &Path, export_name: &str) -> Result<Arc<ClassInfo>> {
        let exports = self.loader.load(module)?;
        exports
            .class(export_name)
            .cloned()
            .ok_or_else(|| FactoryGenError::UnknownBase {
                module: module.to_path_buf(),
                name: export_name.to_string(),
            })
    }

    pub fn declare_from_module(
        &mut self,
        module: &Path,
        export_name: &str,
        output_file: &Path,
        discriminator: &str,
    ) -> Result<RegistryId> {
        let base = self.load_base(module, export_name)?;
        let registry =
            FactoryBuilder::new(base, output_file, discriminator).with_base_source(module, export_name);
        Ok(self.declare_registry(registry))
    }

    /// Scan `source_root`, register every specialisation found and generate
    /// every registry. May only be called once per builder.
    pub fn run(&mut self, source_root: &Path, ignore_paths: &[PathBuf]) -> Result<()> {
        self.scan(source_root, ignore_paths)?;
        let ids: Vec<RegistryId> = self.ids().collect();
        self.regenerate(&ids, INITIAL_BUILD_REASON)
    }

    /// The discovery half of [`run`](Self::run): marks the builder running
    /// and considers every module under `source_root` without generating.
    pub fn scan(&mut self, source_root: &Path, ignore_paths: &[PathBuf]) -> Result<()> {
        if self.running {
            return Err(FactoryGenError::AlreadyRunning);
        }
        self.running = true;

        let files = find_module_files(&paths::normalize(source_root), self.extensions.clone())?;
        log::info!(
            "Scanning {} module(s) under {}",
            files.len(),
            source_root.display()
        );
        for file in &files {
            self.consider_file(file, ignore_paths);
        }
        Ok(())
    }

    /// Reconsider one file: purge what it contributed before, then load it
    /// again and register its specialisations. Returns the registries whose
    /// contents changed, in declaration order.
    pub fn consider_file(&mut self, path: &Path, ignore_paths: &[PathBuf]) -> Vec<RegistryId> {
        let path = paths::normalize(path);
        let mut affected: Vec<bool> = self
            .registries
            .iter_mut()
            .map(|registry| registry.remove_existing_file_references(&path))
            .collect();

        if let Some(reason) = self.skip_reason(&path, ignore_paths) {
            log::debug!("skipping {} because {}", path.display(), reason);
            return collect_affected(&affected);
        }

        let exports = match self.loader.reload(&path) {
            Ok(exports) => exports,
            Err(LoadError::Io { path: missing, source })
                if missing == path && source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::debug!("{} no longer exists", path.display());
                return collect_affected(&affected);
            }
            Err(e) => {
                log::debug!("Could not load module {}: {}", path.display(), e);
                self.diagnostics.push(
                    Diagnostic::warning(format!("Could not load module {}", path.display()))
                        .with_note(e.to_string()),
                );
                return collect_affected(&affected);
            }
        };

        for (export_name, class) in exports.classes() {
            for (index, registry) in self.registries.iter_mut().enumerate() {
                match classify::classify(class, registry.base()) {
                    Classification::Specialisation => {
                        registry.add(Specialisation::new(class.clone(), &path, export_name));
                        affected[index] = true;
                    }
                    Classification::Abstract => {
                        log::debug!(
                            "{} is abstract; not registering it with the {} factory",
                            export_name,
                            registry.base().name
                        );
                    }
                    Classification::NameMatch { ancestor } => {
                        let diagnostic = name_match_warning(
                            self.resolver.as_ref(),
                            export_name,
                            class,
                            registry.base(),
                            ancestor,
                        );
                        self.diagnostics.push(diagnostic);
                    }
                    Classification::Unrelated => {}
                }
            }
        }

        collect_affected(&affected)
    }

    /// Generate each of `affected` with the given reason.
    pub fn regenerate(&mut self, affected: &[RegistryId], reason: &str) -> Result<()> {
        for &id in affected {
            self.generate(id, reason)?;
        }
        Ok(())
    }

    pub fn generate(&mut self, id: RegistryId, reason: &str) -> Result<PathBuf> {
        let registry = self
            .registries
            .get(id.0)
            .ok_or(FactoryGenError::UnknownRegistry(id))?;
        registry.generate(
            reason,
            self.resolver.as_ref(),
            self.emitter.as_ref(),
            &mut self.diagnostics,
        )
    }

    /// Print a registry without writing it.
    pub fn render(&mut self, id: RegistryId) -> Result<String> {
        let registry = self
            .registries
            .get(id.0)
            .ok_or(FactoryGenError::UnknownRegistry(id))?;
        registry.render(
            self.resolver.as_ref(),
            self.emitter.as_ref(),
            &mut self.diagnostics,
        )
    }

    pub fn registry(&self, id: RegistryId) -> Option<&FactoryBuilder> {
        self.registries.get(id.0)
    }

    pub fn registries(&self) -> impl Iterator<Item = (RegistryId, &FactoryBuilder)> {
        self.registries
            .iter()
            .enumerate()
            .map(|(index, registry)| (RegistryId(index), registry))
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    pub fn ids(&self) -> impl Iterator<Item = RegistryId> {
        (0..self.registries.len()).map(RegistryId)
    }

    fn skip_reason(&self, path: &Path, ignore_paths: &[PathBuf]) -> Option<SkipReason> {
        if self.generator_module.as_deref() == Some(path) {
            return Some(SkipReason::GeneratorModule);
        }
        if self.registries.iter().any(|r| r.out_file() == path) {
            return Some(SkipReason::RegistryOutput);
        }
        if let Some(sources) = sibling_map_sources(path) {
            if sources
                .iter()
                .any(|source| self.registries.iter().any(|r| r.out_file() == source))
            {
                return Some(SkipReason::CompiledFromOutput);
            }
        }
        if ignore_paths.iter().any(|root| paths::is_within(path, root)) {
            return Some(SkipReason::Ignored);
        }
        None
    }
}

fn collect_affected(affected: &[bool]) -> Vec<RegistryId> {
    affected
        .iter()
        .enumerate()
        .filter(|(_, changed)| **changed)
        .map(|(index, _)| RegistryId(index))
        .collect()
}

fn name_match_warning(
    resolver: &dyn LocationResolver,
    export_name: &str,
    class: &ClassInfo,
    base: &ClassInfo,
    ancestor: &Superclass,
) -> Diagnostic {
    let ancestor_location = ancestor.class().and_then(|c| try_locate(resolver, c));
    let ancestor_label = match ancestor {
        Superclass::Resolved(_) => format!("{} (the ancestor {} extends)", base.name, export_name),
        Superclass::Unresolved { .. } => {
            format!("{} (the ancestor {} extends, not resolvable)", base.name, export_name)
        }
    };
    log::debug!(
        "{} extends a class named {} that is not the registered base",
        export_name,
        base.name
    );
    Diagnostic::warning(format!(
        "{} extends a class named {} but is not a subtype of the registered {}",
        export_name, base.name, base.name
    ))
    .with_reference(export_name.to_string(), try_locate(resolver, class))
    .with_reference(ancestor_label, ancestor_location)
    .with_reference(format!("{} (registered base)", base.name), try_locate(resolver, base))
    .with_note(format!(
        "1. {} is loaded from two different modules, for example a compiled copy and a source copy, or two installed versions of one package.",
        base.name
    ))
    .with_note(format!(
        "2. {} extends an unrelated class that happens to share the name {}.",
        export_name, base.name
    ))
}
