//! The per-base-type specialisation registry.
//!
//! A [`FactoryBuilder`] owns every concrete subtype discovered for one base
//! class and knows how to turn that set into a factory module. Records are
//! kept in an insertion-ordered arena with a by-file index so that a changed
//! file can be purged without scanning the whole set.

pub mod collisions;
pub mod hashing;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::{CodeEmitter, Comment, Dispatcher, EmissionPlan, ImportName, Item, PlanNode};
use crate::errors::{FactoryGenError, Result};
use crate::io::paths;
use crate::loader::{ClassInfo, StaticValue};
use crate::location::{try_locate, LocationResolver, SourceLocation};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use collisions::CollisionPolicy;
pub use hashing::unique_identifier;

pub const DEFAULT_DISCRIMINATOR: &str = "typeName";

const TABLE_NAME: &str = "typeMappings";
const KEY_TYPE_NAME: &str = "Specialisation";
const BASE_ALIAS: &str = "BaseClass";

const BASE_ALIAS_CAVEAT: &str = "@ts-ignore - a generic base type cannot be named without its \
type arguments here; it works at runtime. The alias keeps the ignore to this one line.";

const SPREAD_CAVEAT: &str = "The table holds constructors with differing parameter lists,
so TypeScript cannot spread `init` into them directly. Cast to a constructor
taking any arguments; argument shapes are not checked at this boundary.";

/// A concrete subtype registered against a base type.
#[derive(Debug, Clone)]
pub struct Specialisation {
    pub class: Arc<ClassInfo>,
    /// Absolute, normalised path of the module that exports the class.
    pub source_file: PathBuf,
    pub export_name: String,
}

impl Specialisation {
    pub fn new(class: Arc<ClassInfo>, source_file: &Path, export_name: impl Into<String>) -> Self {
        Self {
            class,
            source_file: paths::normalize(source_file),
            export_name: export_name.into(),
        }
    }

    pub fn identifier(&self) -> String {
        unique_identifier(&self.source_file, &self.export_name)
    }
}

/// Rewrites the directory a specialisation is imported from, e.g. a compiled
/// `dist/` tree back to `src/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRewrite {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl ImportRewrite {
    pub fn new(from: &Path, to: &Path) -> Self {
        Self {
            from: paths::normalize(from),
            to: paths::normalize(to),
        }
    }

    fn apply(&self, path: &Path) -> Option<PathBuf> {
        paths::is_within(path, &self.from).then(|| paths::rewrite_prefix(path, &self.from, &self.to))
    }
}

#[derive(Debug, Clone)]
pub struct FactoryBuilder {
    base: Arc<ClassInfo>,
    /// Module the base class was taken from and the name it is exported
    /// under there, when known.
    base_source: Option<(PathBuf, String)>,
    out_file: PathBuf,
    discriminator: String,
    policy: CollisionPolicy,
    import_rewrites: Vec<ImportRewrite>,
    records: Vec<Option<Specialisation>>,
    by_file: HashMap<PathBuf, Vec<usize>>,
    live: usize,
}

impl FactoryBuilder {
    pub fn new(base: Arc<ClassInfo>, out_file: &Path, discriminator: impl Into<String>) -> Self {
        Self {
            base_source: None,
            base,
            out_file: paths::normalize(out_file),
            discriminator: discriminator.into(),
            policy: CollisionPolicy::default(),
            import_rewrites: Vec::new(),
            records: Vec::new(),
            by_file: HashMap::new(),
            live: 0,
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Import the base class as `export_name` of `module`. A module other
    /// than the declaring one (an index re-exporting it) is imported from
    /// directly.
    pub fn with_base_source(mut self, module: &Path, export_name: impl Into<String>) -> Self {
        self.base_source = Some((paths::normalize(module), export_name.into()));
        self
    }

    pub fn with_import_rewrites(mut self, rewrites: Vec<ImportRewrite>) -> Self {
        self.import_rewrites = rewrites;
        self
    }

    pub fn base(&self) -> &Arc<ClassInfo> {
        &self.base
    }

    pub fn out_file(&self) -> &Path {
        &self.out_file
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn factory_name(&self) -> String {
        format!("{}Factory", self.base.name)
    }

    pub fn add(&mut self, specialisation: Specialisation) {
        log::debug!(
            "{}: registering {} from {}",
            self.factory_name(),
            specialisation.export_name,
            specialisation.source_file.display()
        );
        self.insert(specialisation);
    }

    /// Drop every record that came from `source_file`. Returns whether
    /// anything was removed.
    pub fn invalidate(&mut self, source_file: &Path) -> bool {
        let Some(indices) = self.by_file.remove(&paths::normalize(source_file)) else {
            return false;
        };
        let mut removed = 0;
        for index in indices {
            if let Some(slot) = self.records.get_mut(index) {
                if slot.take().is_some() {
                    removed += 1;
                }
            }
        }
        self.live -= removed;
        if self.records.len() > 2 * self.live + 16 {
            self.compact();
        }
        removed > 0
    }

    pub fn remove_existing_file_references(&mut self, path: &Path) -> bool {
        self.invalidate(path)
    }

    pub fn specialisations(&self) -> impl Iterator<Item = &Specialisation> {
        self.records.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn compact(&mut self) {
        let records: Vec<Specialisation> = std::mem::take(&mut self.records)
            .into_iter()
            .flatten()
            .collect();
        self.by_file.clear();
        self.live = 0;
        for record in records {
            self.insert(record);
        }
    }

    fn insert(&mut self, specialisation: Specialisation) {
        let index = self.records.len();
        self.by_file
            .entry(specialisation.source_file.clone())
            .or_default()
            .push(index);
        self.records.push(Some(specialisation));
        self.live += 1;
    }

    /// Build the emission plan for the current set, reporting data-quality
    /// problems into `diagnostics`.
    pub fn plan(
        &self,
        resolver: &dyn LocationResolver,
        diagnostics: &mut Diagnostics,
    ) -> Result<EmissionPlan> {
        let specialisations: Vec<&Specialisation> = self.specialisations().collect();
        let locations: Vec<Option<SourceLocation>> = specialisations
            .iter()
            .map(|s| try_locate(resolver, &s.class))
            .collect();

        self.check_collisions(&specialisations, &locations, diagnostics)?;

        let identifiers: Vec<String> = specialisations.iter().map(|s| s.identifier()).collect();
        let out_dir = self.out_dir();
        let mut plan = EmissionPlan::default();

        plan.push(self.base_import(resolver, &out_dir));
        for ((specialisation, identifier), location) in
            specialisations.iter().zip(&identifiers).zip(&locations)
        {
            self.check_discriminator(specialisation, location.as_ref(), diagnostics);
            plan.push(Item::Import {
                specifier: paths::module_specifier(
                    &out_dir,
                    &self.import_path(&specialisation.source_file),
                ),
                names: vec![ImportName::aliased(
                    specialisation.export_name.clone(),
                    identifier.clone(),
                )],
            });
        }

        plan.push(Item::ConstTable {
            name: TABLE_NAME.to_string(),
            entries: collisions::build_table(
                &specialisations,
                &identifiers,
                &self.discriminator,
                self.policy,
            ),
        });
        plan.push(Item::KeyOf {
            name: KEY_TYPE_NAME.to_string(),
            table: TABLE_NAME.to_string(),
            exported: true,
        });
        plan.push(PlanNode::with_comment(
            Item::TypeAlias {
                name: BASE_ALIAS.to_string(),
                target: self.base_local_name(),
                exported: false,
            },
            Comment::Line(BASE_ALIAS_CAVEAT.to_string()),
        ));
        plan.push(Item::ErrorClass {
            name: self.error_class_name(),
            extends: "Error".to_string(),
        });
        plan.push(Item::Dispatcher(Dispatcher {
            name: self.factory_name(),
            parameter: self.discriminator.clone(),
            key_type: KEY_TYPE_NAME.to_string(),
            return_type: BASE_ALIAS.to_string(),
            table: TABLE_NAME.to_string(),
            error_class: self.error_class_name(),
            spread_caveat: Some(SPREAD_CAVEAT.to_string()),
        }));

        plan.header = self.header(&specialisations, &locations, &out_dir);
        Ok(plan)
    }

    /// Print the factory module without touching the output file.
    pub fn render(
        &self,
        resolver: &dyn LocationResolver,
        emitter: &dyn CodeEmitter,
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let plan = self.plan(resolver, diagnostics)?;
        Ok(emitter.emit(&plan)?)
    }

    /// Render and overwrite the output file. Returns the path written.
    pub fn generate(
        &self,
        reason: &str,
        resolver: &dyn LocationResolver,
        emitter: &dyn CodeEmitter,
        diagnostics: &mut Diagnostics,
    ) -> Result<PathBuf> {
        let verb = if self.out_file.exists() {
            "Regenerating"
        } else {
            "Generating"
        };
        log::info!("{} {} factory because {}", verb, self.base.name, reason);

        let text = self.render(resolver, emitter, diagnostics)?;
        crate::io::write_file(&self.out_file, &text)?;
        Ok(self.out_file.clone())
    }

    fn out_dir(&self) -> PathBuf {
        self.out_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn error_class_name(&self) -> String {
        format!("{}FactoryCreateError", self.base.name)
    }

    /// Local name for the base import; steps around names the generated
    /// module already uses.
    fn base_local_name(&self) -> String {
        let name = &self.base.name;
        if crate::emit::is_identifier(name) && name != BASE_ALIAS && name != "default" {
            name.clone()
        } else {
            format!("{}Base", self.factory_name())
        }
    }

    fn base_import(&self, resolver: &dyn LocationResolver, out_dir: &Path) -> Item {
        let declared_origin = || match try_locate(resolver, &self.base) {
            Some(location) => paths::to_runtime_extension(&location.file),
            None => self.base.id.module.clone(),
        };
        let (origin, export) = match &self.base_source {
            Some((module, export)) if *module != self.base.id.module => {
                (self.import_path(module), export.clone())
            }
            Some((_, export)) => (declared_origin(), export.clone()),
            None => (declared_origin(), self.base.id.name.clone()),
        };
        let local = self.base_local_name();
        let name = if export == local {
            ImportName::plain(local)
        } else {
            ImportName::aliased(export, local)
        };
        Item::Import {
            specifier: paths::module_specifier(out_dir, &origin),
            names: vec![name],
        }
    }

    fn import_path(&self, source_file: &Path) -> PathBuf {
        self.import_rewrites
            .iter()
            .find_map(|rewrite| rewrite.apply(source_file))
            .unwrap_or_else(|| source_file.to_path_buf())
    }

    fn check_collisions(
        &self,
        specialisations: &[&Specialisation],
        locations: &[Option<SourceLocation>],
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let groups = collisions::group_by_discriminator(specialisations, &self.discriminator);
        for (key, members) in groups.iter().filter(|(_, members)| members.len() > 1) {
            let value = key.clone();
            let mut diagnostic = Diagnostic::warning(format!(
                "Multiple classes use the same value for {} ({})",
                self.discriminator, value
            ));
            for &index in members {
                diagnostic = diagnostic.with_reference(
                    specialisations[index].export_name.clone(),
                    locations[index].clone(),
                );
            }

            if self.policy == CollisionPolicy::Fail {
                let sources = members
                    .iter()
                    .map(|&i| {
                        format!(
                            "{} ({})",
                            specialisations[i].export_name,
                            specialisations[i].source_file.display()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                diagnostics.push(diagnostic);
                return Err(FactoryGenError::DuplicateDiscriminator {
                    base: self.base.name.clone(),
                    property: self.discriminator.clone(),
                    value,
                    sources,
                });
            }
            diagnostics.push(diagnostic.with_note(format!(
                "resolved with the {} collision policy",
                self.policy
            )));
        }
        Ok(())
    }

    fn check_discriminator(
        &self,
        specialisation: &Specialisation,
        location: Option<&SourceLocation>,
        diagnostics: &mut Diagnostics,
    ) {
        let name = &specialisation.export_name;
        let diagnostic = match specialisation.class.static_value(&self.discriminator) {
            None => Diagnostic::error(format!(
                "{} is missing discriminating property {}",
                name, self.discriminator
            )),
            Some(StaticValue::String(_)) => return,
            Some(StaticValue::Expression(_)) => Diagnostic::warning(format!(
                "{}'s discriminating property {} is not statically known",
                name, self.discriminator
            ))
            .with_note("the factory reads it from the class at runtime; collisions with it cannot be detected"),
            Some(_) => Diagnostic::error(format!(
                "{}'s discriminating property {} is not a string",
                name, self.discriminator
            )),
        };
        diagnostics.push(diagnostic.with_reference(name.clone(), location.cloned()));
    }

    fn header(
        &self,
        specialisations: &[&Specialisation],
        locations: &[Option<SourceLocation>],
        out_dir: &Path,
    ) -> Vec<String> {
        let mut lines = vec![
            "WARNING: This file is auto-generated by factorygen.".to_string(),
            String::new(),
            "Any changes made directly in this file may be overwritten the next time the generator runs.".to_string(),
            String::new(),
            "To modify the behavior of this file, update the source files and rerun the generator instead.".to_string(),
            String::new(),
            "Sources:".to_string(),
        ];
        let mut sources = indexmap::IndexSet::new();
        for (specialisation, location) in specialisations.iter().zip(locations) {
            let entry = match location {
                Some(location) => paths::display_relative(out_dir, &location.file),
                None => format!(
                    "{} (unresolved: {})",
                    specialisation.export_name,
                    paths::display_relative(out_dir, &specialisation.source_file)
                ),
            };
            sources.insert(entry);
        }
        lines.extend(sources);
        lines
    }
}
