use anyhow::Result;
use clap::Parser;
use factorygen::cli::{setup, Cli, Commands};
use factorygen::commands::{handle_generate, init_config, GenerateConfig};
use factorygen::formatting::FormattingConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            source_root,
            config,
            ignore,
            dry_run,
            color,
            verbosity,
        } => {
            setup::init_logging(verbosity);
            let generate_config = GenerateConfig {
                source_root,
                config,
                ignore,
                dry_run,
                formatting_config: FormattingConfig::from_env().with_override(color.into()),
            };
            let report = handle_generate(generate_config)?;
            log::debug!(
                "{} factories written, {} warning(s), {} error(s)",
                report.written.len(),
                report.warnings,
                report.errors
            );
            Ok(())
        }
        Commands::Init { force } => {
            setup::init_logging(0);
            init_config(force)
        }
    }
}
