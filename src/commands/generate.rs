use crate::config::{load_config, FactorygenConfig};
use crate::diagnostics::Severity;
use crate::formatting::{render_diagnostic, ColoredFormatter, FormattingConfig, OutputFormatter};
use crate::orchestrator::FactoriesBuilder;
use crate::registry::{FactoryBuilder, ImportRewrite};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub source_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub ignore: Vec<PathBuf>,
    pub dry_run: bool,
    pub formatting_config: FormattingConfig,
}

/// Outcome of one `generate` invocation.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub written: Vec<PathBuf>,
    pub warnings: usize,
    pub errors: usize,
}

/// Declare one registry per `[[factory]]` table on a builder wired with the
/// default loader, resolver and emitter.
pub fn build_factories(config: &FactorygenConfig) -> Result<FactoriesBuilder> {
    let mut factories = FactoriesBuilder::default().with_extensions(config.module_extensions());
    if let Some(module) = &config.generator_module {
        factories = factories.with_generator_module(module);
    }

    let rewrites: Vec<ImportRewrite> = config
        .import_rewrites
        .iter()
        .map(|rewrite| ImportRewrite::new(&rewrite.from, &rewrite.to))
        .collect();

    for factory in &config.factories {
        let base = factories
            .load_base(&factory.base.module, &factory.base.name)
            .with_context(|| {
                format!(
                    "Failed to load base class {} from {}",
                    factory.base.name,
                    factory.base.module.display()
                )
            })?;
        let registry = FactoryBuilder::new(base, &factory.output, factory.discriminator.clone())
            .with_base_source(&factory.base.module, factory.base.name.clone())
            .with_policy(factory.collision)
            .with_import_rewrites(rewrites.clone());
        factories.declare_registry(registry);
    }

    Ok(factories)
}

pub fn handle_generate(config: GenerateConfig) -> Result<GenerateReport> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let (config_path, file_config) = load_config(config.config.as_deref(), &cwd)?
        .context("No .factorygen.toml found; run `factorygen init` to create one")?;
    if file_config.factories.is_empty() {
        anyhow::bail!("{} declares no [[factory]] tables", config_path.display());
    }

    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.clone());
    let source_root = match &config.source_root {
        Some(root) => cwd.join(root),
        None => file_config.source_root.clone().unwrap_or(config_dir),
    };
    let mut ignore_paths = file_config.ignore_paths.clone();
    ignore_paths.extend(config.ignore.iter().map(|path| cwd.join(path)));

    let mut factories = build_factories(&file_config)?;
    let mut report = GenerateReport::default();

    let outcome = if config.dry_run {
        print_dry_run(&mut factories, &source_root, &ignore_paths)
    } else {
        factories
            .run(&source_root, &ignore_paths)
            .with_context(|| format!("Failed to generate factories under {}", source_root.display()))
    };

    // Diagnostics explain most failures, so they are shown before the error.
    let formatter = ColoredFormatter::new(config.formatting_config);
    report.warnings = factories.diagnostics().count(Severity::Warning);
    report.errors = factories.diagnostics().count(Severity::Error);
    for diagnostic in factories.take_diagnostics() {
        eprintln!("{}", render_diagnostic(&formatter, &diagnostic, &cwd));
    }
    outcome?;

    if !config.dry_run {
        report.written = factories
            .registries()
            .map(|(_, registry)| registry.out_file().to_path_buf())
            .collect();
    }
    for path in &report.written {
        let shown = crate::io::paths::display_relative(&cwd, path);
        eprintln!("{} {}", formatter.success("Wrote"), shown);
    }

    Ok(report)
}

fn print_dry_run(
    factories: &mut FactoriesBuilder,
    source_root: &Path,
    ignore_paths: &[PathBuf],
) -> Result<()> {
    factories
        .scan(source_root, ignore_paths)
        .with_context(|| format!("Failed to scan {}", source_root.display()))?;
    let ids: Vec<_> = factories.ids().collect();
    for id in ids {
        let text = factories.render(id)?;
        if let Some(registry) = factories.registry(id) {
            println!("// {}", registry.out_file().display());
        }
        println!("{}", text);
    }
    Ok(())
}
