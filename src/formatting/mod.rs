use crate::diagnostics::{Diagnostic, Severity};
use crate::location::SourceLocation;
use colored::*;
use std::env;
use std::io::IsTerminal;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,   // Detect based on terminal
    Always, // Force colors on
    Never,  // Force colors off
}

impl ColorMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn should_use_color(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => detect_color_support(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormattingConfig {
    pub color: ColorMode,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
        }
    }
}

impl FormattingConfig {
    pub fn new(color: ColorMode) -> Self {
        Self { color }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Check NO_COLOR environment variable (per no-color.org standard)
        if env::var("NO_COLOR").is_ok() {
            config.color = ColorMode::Never;
        }

        if let Ok(val) = env::var("CLICOLOR") {
            if val == "0" {
                config.color = ColorMode::Never;
            }
        }

        if let Ok(val) = env::var("CLICOLOR_FORCE") {
            if val == "1" {
                config.color = ColorMode::Always;
            }
        }

        config
    }

    /// An explicit `--color` choice beats the environment; `auto` defers to it.
    pub fn with_override(self, color: ColorMode) -> Self {
        match color {
            ColorMode::Auto => self,
            explicit => Self { color: explicit },
        }
    }

    pub fn plain() -> Self {
        Self {
            color: ColorMode::Never,
        }
    }
}

pub trait OutputFormatter {
    fn success(&self, text: &str) -> String;
    fn error(&self, text: &str) -> String;
    fn warning(&self, text: &str) -> String;
    fn info(&self, text: &str) -> String;
    fn highlight(&self, text: &str) -> String;
    fn dim(&self, text: &str) -> String;
}

pub struct ColoredFormatter {
    config: FormattingConfig,
}

impl ColoredFormatter {
    pub fn new(config: FormattingConfig) -> Self {
        // Set colored control based on configuration
        if config.color.should_use_color() {
            colored::control::set_override(true);
        } else {
            colored::control::set_override(false);
        }

        Self { config }
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
        if self.config.color.should_use_color() {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn success(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    fn warning(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    fn info(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    fn highlight(&self, text: &str) -> String {
        self.paint(text, |t| t.magenta())
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed())
    }
}

pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn success(&self, text: &str) -> String {
        text.to_string()
    }

    fn error(&self, text: &str) -> String {
        text.to_string()
    }

    fn warning(&self, text: &str) -> String {
        text.to_string()
    }

    fn info(&self, text: &str) -> String {
        text.to_string()
    }

    fn highlight(&self, text: &str) -> String {
        text.to_string()
    }

    fn dim(&self, text: &str) -> String {
        text.to_string()
    }
}

/// `file:line:col`, with the file relative to `cwd` and the numbers in a
/// second colour.
pub fn format_location(
    formatter: &dyn OutputFormatter,
    location: &SourceLocation,
    cwd: &Path,
) -> String {
    let file = crate::io::paths::display_relative(cwd, &location.file);
    format!(
        "{}:{}:{}",
        formatter.info(&file),
        formatter.warning(&location.line.to_string()),
        formatter.warning(&location.column.to_string())
    )
}

/// Multi-line terminal rendering of one diagnostic.
pub fn render_diagnostic(formatter: &dyn OutputFormatter, diagnostic: &Diagnostic, cwd: &Path) -> String {
    let severity = match diagnostic.severity {
        Severity::Warning => formatter.warning("WARNING"),
        Severity::Error => formatter.error("ERROR"),
    };
    let mut out = format!("{} - {}", severity, diagnostic.message);

    if !diagnostic.references.is_empty() {
        out.push_str("\n      References found:");
    }
    for reference in &diagnostic.references {
        let location = match &reference.location {
            Some(location) => format_location(formatter, location, cwd),
            None => formatter.dim("location unknown"),
        };
        out.push_str(&format!(
            "\n        {} {}",
            formatter.highlight(&reference.label),
            location
        ));
    }
    for note in &diagnostic.notes {
        out.push_str(&format!("\n      {}", note));
    }
    out
}

fn detect_color_support() -> bool {
    // Check if we're in a dumb terminal
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    std::io::stdout().is_terminal()
}
