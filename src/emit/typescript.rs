//! Deterministic TypeScript printer for emission plans.

use super::banner::box_comment;
use super::{
    is_identifier, CodeEmitter, Comment, Dispatcher, EmissionPlan, EmitError, ImportName, Item,
    TableEntry, TableKey,
};
use std::fmt::Write as _;

pub struct TypeScriptEmitter {
    indent: String,
}

impl Default for TypeScriptEmitter {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TypeScriptEmitter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent: " ".repeat(indent_width),
        }
    }

    fn indent(&self, level: usize) -> String {
        self.indent.repeat(level)
    }

    fn comment(&self, out: &mut String, comment: &Comment, level: usize) {
        let pad = self.indent(level);
        match comment {
            Comment::Line(text) => {
                for line in text.lines() {
                    let _ = writeln!(out, "{}// {}", pad, line);
                }
            }
            Comment::Block(text) => {
                let _ = writeln!(out, "{}/*", pad);
                for line in text.lines() {
                    let _ = writeln!(out, "{}{}", pad, line.trim().replace("*/", "* /"));
                }
                let _ = writeln!(out, "{}*/", pad);
            }
        }
    }

    fn import(
        &self,
        out: &mut String,
        specifier: &str,
        names: &[ImportName],
    ) -> Result<(), EmitError> {
        if names.is_empty() {
            return Err(EmitError::EmptyImport(specifier.to_string()));
        }
        let mut specifiers = Vec::with_capacity(names.len());
        for name in names {
            let imported = export_name(&name.imported);
            match &name.local {
                Some(local) if local != &name.imported => {
                    require_identifier(local)?;
                    specifiers.push(format!("{} as {}", imported, local));
                }
                _ => {
                    require_identifier(&name.imported)?;
                    specifiers.push(imported);
                }
            }
        }
        let _ = writeln!(
            out,
            "import {{ {} }} from {};",
            specifiers.join(", "),
            string_literal(specifier)
        );
        Ok(())
    }

    fn table(&self, out: &mut String, name: &str, entries: &[TableEntry]) -> Result<(), EmitError> {
        require_identifier(name)?;
        if entries.is_empty() {
            let _ = writeln!(out, "const {} = {{}} as const;", name);
            return Ok(());
        }
        let _ = writeln!(out, "const {} = {{", name);
        let pad = self.indent(1);
        for (i, entry) in entries.iter().enumerate() {
            require_identifier(&entry.value)?;
            let separator = if i + 1 < entries.len() { "," } else { "" };
            let _ = writeln!(
                out,
                "{}{}: {}{}",
                pad,
                table_key(&entry.key),
                entry.value,
                separator
            );
        }
        let _ = writeln!(out, "}} as const;");
        Ok(())
    }

    fn dispatcher(&self, out: &mut String, d: &Dispatcher) -> Result<(), EmitError> {
        for ident in [
            &d.name,
            &d.parameter,
            &d.key_type,
            &d.return_type,
            &d.table,
            &d.error_class,
        ] {
            require_identifier(ident)?;
        }
        let i1 = self.indent(1);
        let i2 = self.indent(2);
        let i3 = self.indent(3);

        let _ = writeln!(out, "export class {} {{", d.name);
        let _ = writeln!(
            out,
            "{}static create({}: {}, ...init: any[]): {} {{",
            i1, d.parameter, d.key_type, d.return_type
        );
        let _ = writeln!(out, "{}const constr = {}[{}];", i2, d.table, d.parameter);
        let _ = writeln!(out, "{}if (!constr) {{", i2);
        let _ = writeln!(
            out,
            "{}throw new {}(`${{{}}} is not a valid value for \\`{}\\``);",
            i3, d.error_class, d.parameter, d.parameter
        );
        let _ = writeln!(out, "{}}}", i2);
        if let Some(caveat) = &d.spread_caveat {
            self.comment(out, &Comment::Block(caveat.clone()), 2);
        }
        let _ = writeln!(out, "{}type SpreadConstructor = {{", i2);
        let _ = writeln!(out, "{}new (...args: any[]): {};", i3, d.return_type);
        let _ = writeln!(out, "{}}};", i2);
        let _ = writeln!(
            out,
            "{}return new (constr as unknown as SpreadConstructor)(...init);",
            i2
        );
        let _ = writeln!(out, "{}}}", i1);
        let _ = writeln!(out, "}}");
        Ok(())
    }
}

impl CodeEmitter for TypeScriptEmitter {
    fn emit(&self, plan: &EmissionPlan) -> Result<String, EmitError> {
        let mut out = String::new();
        if !plan.header.is_empty() {
            out.push_str(&box_comment(&plan.header));
            out.push('\n');
        }

        for node in &plan.nodes {
            if let Some(comment) = &node.leading_comment {
                self.comment(&mut out, comment, 0);
            }
            match &node.item {
                Item::Import { specifier, names } => self.import(&mut out, specifier, names)?,
                Item::ConstTable { name, entries } => self.table(&mut out, name, entries)?,
                Item::KeyOf {
                    name,
                    table,
                    exported,
                } => {
                    require_identifier(name)?;
                    require_identifier(table)?;
                    let _ = writeln!(
                        out,
                        "{}type {} = keyof typeof {};",
                        export_prefix(*exported),
                        name,
                        table
                    );
                }
                Item::TypeAlias {
                    name,
                    target,
                    exported,
                } => {
                    require_identifier(name)?;
                    require_identifier(target)?;
                    let _ = writeln!(out, "{}type {} = {};", export_prefix(*exported), name, target);
                }
                Item::ErrorClass { name, extends } => {
                    require_identifier(name)?;
                    require_identifier(extends)?;
                    let _ = writeln!(out, "export class {} extends {} {{\n}}", name, extends);
                }
                Item::Dispatcher(dispatcher) => self.dispatcher(&mut out, dispatcher)?,
            }
        }
        Ok(out)
    }
}

fn export_prefix(exported: bool) -> &'static str {
    if exported {
        "export "
    } else {
        ""
    }
}

fn require_identifier(name: &str) -> Result<(), EmitError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(EmitError::InvalidIdentifier(name.to_string()))
    }
}

/// Imported names may be arbitrary strings (`import { "a-b" as x }`).
fn export_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

fn string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

fn table_key(key: &TableKey) -> String {
    match key {
        TableKey::String(s) if is_identifier(s) => s.clone(),
        TableKey::String(s) => string_literal(s),
        // `{ -1: x }` is not valid syntax
        TableKey::Number(n) if n.starts_with('-') => string_literal(n),
        TableKey::Number(n) => n.clone(),
        TableKey::Boolean(b) => b.to_string(),
        TableKey::Null => "null".to_string(),
        TableKey::Undefined => "undefined".to_string(),
        TableKey::Computed(expr) => format!("[{}]", expr),
    }
}
