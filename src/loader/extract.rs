//! Syntactic facts about one module: its classes, imports and exports.
//!
//! Nothing here follows imports; [`super::resolve`] stitches modules together.

use super::parser::{node_column, node_line, node_text, ParsedSource};
use super::StaticValue;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq)]
pub enum Heritage {
    Identifier(String),
    /// `extends ns.Shape`
    Member { object: String, property: String },
    Expression(String),
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Module-level binding; `None` for `export default class {}`.
    pub binding: Option<String>,
    pub name: String,
    pub heritage: Option<Heritage>,
    pub statics: IndexMap<String, StaticValue>,
    pub is_abstract: bool,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalBinding {
    Class(usize),
    Function,
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Named(String),
    Default,
    Namespace,
}

impl Imported {
    fn from_export_name(name: &str) -> Self {
        if name == "default" {
            Imported::Default
        } else {
            Imported::Named(name.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub specifier: String,
    pub imported: Imported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// A module-level binding of this module (possibly an import).
    Local(String),
    /// Anonymous class exported as default.
    Class(usize),
    Function,
    Value,
    ReExport { specifier: String, imported: Imported },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub exported: String,
    pub target: ExportTarget,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    pub path: PathBuf,
    pub classes: Vec<ClassDecl>,
    pub bindings: HashMap<String, LocalBinding>,
    pub imports: HashMap<String, ImportBinding>,
    pub exports: Vec<ExportEntry>,
    /// `export * from '...'` specifiers, in order.
    pub star_exports: Vec<String>,
    pub source_mapping_url: Option<String>,
}

impl ParsedModule {
    pub fn export(&self, name: &str) -> Option<&ExportEntry> {
        self.exports.iter().find(|e| e.exported == name)
    }
}

pub fn extract_module(parsed: &ParsedSource) -> ParsedModule {
    let mut module = ParsedModule {
        path: parsed.path.clone(),
        ..ParsedModule::default()
    };
    let mut assignments = Vec::new();
    let source = parsed.source.as_str();
    let root = parsed.tree.root_node();

    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        extract_statement(&statement, source, &mut module, &mut assignments);
    }

    for (object, property, value) in assignments {
        if let Some(LocalBinding::Class(index)) = module.bindings.get(&object) {
            module.classes[*index].statics.insert(property, value);
        }
    }

    module
}

type StaticAssignment = (String, String, StaticValue);

fn extract_statement(
    node: &Node,
    source: &str,
    module: &mut ParsedModule,
    assignments: &mut Vec<StaticAssignment>,
) {
    match node.kind() {
        "import_statement" => extract_import(node, source, module),
        "export_statement" => extract_export(node, source, module),
        "expression_statement" => {
            if let Some(assignment) = static_assignment(node, source) {
                assignments.push(assignment);
            }
        }
        "comment" => {
            let text = node_text(node, source);
            if let Some(url) = text
                .strip_prefix("//# sourceMappingURL=")
                .or_else(|| text.strip_prefix("//@ sourceMappingURL="))
            {
                module.source_mapping_url = Some(url.trim().to_string());
            }
        }
        _ => {
            declare(node, source, module);
        }
    }
}

/// Register a declaration's bindings. Returns the names it declared.
fn declare(node: &Node, source: &str, module: &mut ParsedModule) -> Vec<String> {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" => {
            let Some(name) = node
                .child_by_field_name("name")
                .map(|n| node_text(&n, source).to_string())
            else {
                return Vec::new();
            };
            let index = push_class(node, source, Some(name.clone()), None, module);
            module.bindings.insert(name.clone(), LocalBinding::Class(index));
            vec![name]
        }
        "function_declaration" | "generator_function_declaration" => {
            match node.child_by_field_name("name") {
                Some(name) => {
                    let name = node_text(&name, source).to_string();
                    module.bindings.insert(name.clone(), LocalBinding::Function);
                    vec![name]
                }
                None => Vec::new(),
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut declared = Vec::new();
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(name_node) = declarator.child_by_field_name("name") else {
                    continue;
                };
                if name_node.kind() != "identifier" {
                    continue;
                }
                let name = node_text(&name_node, source).to_string();
                let binding = match declarator.child_by_field_name("value") {
                    Some(value) => bind_value(&value, source, &name, module),
                    None => LocalBinding::Value,
                };
                module.bindings.insert(name.clone(), binding);
                declared.push(name);
            }
            declared
        }
        "enum_declaration" => match node.child_by_field_name("name") {
            Some(name) => {
                let name = node_text(&name, source).to_string();
                module.bindings.insert(name.clone(), LocalBinding::Value);
                vec![name]
            }
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn bind_value(value: &Node, source: &str, binding: &str, module: &mut ParsedModule) -> LocalBinding {
    let value = unwrap_expression(value);
    match value.kind() {
        "class" => {
            let index = push_class(&value, source, Some(binding.to_string()), None, module);
            LocalBinding::Class(index)
        }
        "function_expression" | "function" | "arrow_function" | "generator_function" => {
            LocalBinding::Function
        }
        _ => LocalBinding::Value,
    }
}

/// Strip parentheses and chained assignments (`let A = A_1 = class A {}`).
fn unwrap_expression<'t>(node: &Node<'t>) -> Node<'t> {
    match node.kind() {
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| unwrap_expression(&inner))
            .unwrap_or(*node),
        "assignment_expression" => node
            .child_by_field_name("right")
            .map(|right| unwrap_expression(&right))
            .unwrap_or(*node),
        _ => *node,
    }
}

fn push_class(
    node: &Node,
    source: &str,
    binding: Option<String>,
    fallback_name: Option<&str>,
    module: &mut ParsedModule,
) -> usize {
    let own_name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string());
    let name = own_name
        .or_else(|| binding.clone())
        .or_else(|| fallback_name.map(str::to_string))
        .unwrap_or_default();

    let mut statics = IndexMap::new();
    if let Some(body) = node.child_by_field_name("body") {
        collect_statics(&body, source, &mut statics);
    }

    module.classes.push(ClassDecl {
        binding,
        name,
        heritage: heritage(node, source),
        statics,
        is_abstract: node.kind() == "abstract_class_declaration",
        line: node_line(node),
        column: node_column(node),
    });
    module.classes.len() - 1
}

fn heritage(class: &Node, source: &str) -> Option<Heritage> {
    let mut cursor = class.walk();
    let heritage = class
        .children(&mut cursor)
        .find(|c| c.kind() == "class_heritage")?;

    let expression = {
        let mut cursor = heritage.walk();
        let children: Vec<Node> = heritage.named_children(&mut cursor).collect();
        match children.iter().find(|c| c.kind() == "extends_clause") {
            // TypeScript grammar
            Some(extends) => extends.child_by_field_name("value")?,
            None => children
                .into_iter()
                .find(|c| c.kind() != "implements_clause" && c.kind() != "comment")?,
        }
    };
    let expression = unwrap_expression(&expression);

    Some(match expression.kind() {
        "identifier" => Heritage::Identifier(node_text(&expression, source).to_string()),
        "member_expression" => {
            let object = expression.child_by_field_name("object");
            let property = expression.child_by_field_name("property");
            match (object, property) {
                (Some(object), Some(property)) if object.kind() == "identifier" => {
                    Heritage::Member {
                        object: node_text(&object, source).to_string(),
                        property: node_text(&property, source).to_string(),
                    }
                }
                _ => Heritage::Expression(node_text(&expression, source).to_string()),
            }
        }
        _ => Heritage::Expression(node_text(&expression, source).to_string()),
    })
}

fn collect_statics(body: &Node, source: &str, statics: &mut IndexMap<String, StaticValue>) {
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "field_definition" | "public_field_definition" => {
                if !has_token(&member, &["static"]) {
                    continue;
                }
                let Some(name) = member
                    .child_by_field_name("property")
                    .or_else(|| member.child_by_field_name("name"))
                    .and_then(|n| property_name(&n, source))
                else {
                    continue;
                };
                let value = member
                    .child_by_field_name("value")
                    .map(|v| static_value(&v, source))
                    .unwrap_or(StaticValue::Undefined);
                statics.insert(name, value);
            }
            "method_definition" => {
                let is_static_getter = has_token(&member, &["static get"])
                    || (has_token(&member, &["static"]) && has_token(&member, &["get"]));
                if !is_static_getter {
                    continue;
                }
                let name = member
                    .child_by_field_name("name")
                    .and_then(|n| property_name(&n, source));
                let returned = member
                    .child_by_field_name("body")
                    .and_then(|b| single_returned_value(&b, source));
                if let (Some(name), Some(value)) = (name, returned) {
                    statics.insert(name, value);
                }
            }
            "class_static_block" => {
                if let Some(block) = member.child_by_field_name("body") {
                    let mut cursor = block.walk();
                    for statement in block.named_children(&mut cursor) {
                        if let Some((object, property, value)) =
                            static_assignment(&statement, source)
                        {
                            if object == "this" {
                                statics.insert(property, value);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn has_token(node: &Node, kinds: &[&str]) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| kinds.contains(&c.kind()));
    found
}

fn property_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "property_identifier" | "identifier" => Some(node_text(node, source).to_string()),
        "string" => Some(string_value(node, source)),
        "number" => Some(node_text(node, source).to_string()),
        _ => None,
    }
}

/// `return <literal>;` as the only statement of a getter body.
fn single_returned_value(block: &Node, source: &str) -> Option<StaticValue> {
    let mut cursor = block.walk();
    let statements: Vec<Node> = block
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    match statements.as_slice() {
        [statement] if statement.kind() == "return_statement" => {
            statement.named_child(0).map(|v| static_value(&v, source))
        }
        _ => None,
    }
}

/// `X.prop = value;` (or `this.prop = value;` inside a static block).
fn static_assignment(statement: &Node, source: &str) -> Option<StaticAssignment> {
    if statement.kind() != "expression_statement" {
        return None;
    }
    let assignment = statement.named_child(0)?;
    if assignment.kind() != "assignment_expression" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "member_expression" {
        return None;
    }
    let object = left.child_by_field_name("object")?;
    if object.kind() != "identifier" && object.kind() != "this" {
        return None;
    }
    let property = left.child_by_field_name("property")?;
    if property.kind() != "property_identifier" {
        return None;
    }
    let right = assignment.child_by_field_name("right")?;
    Some((
        node_text(&object, source).to_string(),
        node_text(&property, source).to_string(),
        static_value(&right, source),
    ))
}

pub(crate) fn static_value(node: &Node, source: &str) -> StaticValue {
    let node = unwrap_expression(node);
    match node.kind() {
        "string" => StaticValue::String(string_value(&node, source)),
        "template_string" => {
            let mut cursor = node.walk();
            let has_substitution = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                StaticValue::Expression(node_text(&node, source).to_string())
            } else {
                StaticValue::String(string_value(&node, source))
            }
        }
        "number" => StaticValue::Number(node_text(&node, source).to_string()),
        "unary_expression" => {
            let text = node_text(&node, source);
            let is_negative_number = node
                .child_by_field_name("argument")
                .is_some_and(|a| a.kind() == "number")
                && text.starts_with('-');
            if is_negative_number {
                StaticValue::Number(text.replace(char::is_whitespace, ""))
            } else {
                StaticValue::Expression(text.to_string())
            }
        }
        "true" => StaticValue::Boolean(true),
        "false" => StaticValue::Boolean(false),
        "null" => StaticValue::Null,
        "undefined" => StaticValue::Undefined,
        "identifier" if node_text(&node, source) == "undefined" => StaticValue::Undefined,
        _ => StaticValue::Expression(node_text(&node, source).to_string()),
    }
}

/// Decoded contents of a string or template literal.
pub(crate) fn string_value(node: &Node, source: &str) -> String {
    let mut out = String::new();
    let mut cursor = node.walk();
    let mut saw_part = false;
    for part in node.named_children(&mut cursor) {
        match part.kind() {
            "string_fragment" => {
                out.push_str(node_text(&part, source));
                saw_part = true;
            }
            "escape_sequence" => {
                out.push_str(&unescape(node_text(&part, source)));
                saw_part = true;
            }
            _ => {}
        }
    }
    if saw_part {
        return out;
    }
    // Grammars that expose no fragments: strip the delimiters.
    let text = node_text(node, source);
    let quote = |c: char| c == '"' || c == '\'' || c == '`';
    text.strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(text)
        .to_string()
}

fn unescape(sequence: &str) -> String {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    let mut chars = body.chars();
    match chars.next() {
        Some('n') => "\n".into(),
        Some('t') => "\t".into(),
        Some('r') => "\r".into(),
        Some('0') if body.len() == 1 => "\0".into(),
        Some('b') => "\u{8}".into(),
        Some('f') => "\u{c}".into(),
        Some('v') => "\u{b}".into(),
        Some('u') => {
            let hex = body[1..].trim_start_matches('{').trim_end_matches('}');
            u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| sequence.to_string())
        }
        Some('x') => u32::from_str_radix(&body[1..], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| sequence.to_string()),
        Some('\n') => String::new(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn extract_import(node: &Node, source: &str, module: &mut ParsedModule) {
    let Some(specifier) = node
        .child_by_field_name("source")
        .map(|s| string_value(&s, source))
    else {
        return;
    };

    let mut cursor = node.walk();
    let Some(clause) = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_clause")
    else {
        return;
    };

    let mut cursor = clause.walk();
    for part in clause.named_children(&mut cursor) {
        match part.kind() {
            "identifier" => {
                module.imports.insert(
                    node_text(&part, source).to_string(),
                    ImportBinding {
                        specifier: specifier.clone(),
                        imported: Imported::Default,
                    },
                );
            }
            "namespace_import" => {
                let mut inner = part.walk();
                let local = part
                    .named_children(&mut inner)
                    .find(|c| c.kind() == "identifier");
                if let Some(local) = local {
                    module.imports.insert(
                        node_text(&local, source).to_string(),
                        ImportBinding {
                            specifier: specifier.clone(),
                            imported: Imported::Namespace,
                        },
                    );
                }
            }
            "named_imports" => {
                let mut inner = part.walk();
                for import in part.named_children(&mut inner) {
                    if import.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = import
                        .child_by_field_name("name")
                        .map(|n| module_export_name(&n, source))
                    else {
                        continue;
                    };
                    let local = import
                        .child_by_field_name("alias")
                        .map(|a| node_text(&a, source).to_string())
                        .unwrap_or_else(|| name.clone());
                    module.imports.insert(
                        local,
                        ImportBinding {
                            specifier: specifier.clone(),
                            imported: Imported::from_export_name(&name),
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

fn module_export_name(node: &Node, source: &str) -> String {
    if node.kind() == "string" {
        string_value(node, source)
    } else {
        node_text(node, source).to_string()
    }
}

fn extract_export(node: &Node, source: &str, module: &mut ParsedModule) {
    let is_default = has_token(node, &["default"]);
    let from = node
        .child_by_field_name("source")
        .map(|s| string_value(&s, source));

    if let Some(declaration) = node.child_by_field_name("declaration") {
        let declared = declare(&declaration, source, module);
        if is_default {
            if let Some(name) = declared.into_iter().next() {
                module.exports.push(ExportEntry {
                    exported: "default".to_string(),
                    target: ExportTarget::Local(name),
                });
            } else if matches!(
                declaration.kind(),
                "function_declaration" | "generator_function_declaration"
            ) {
                module.exports.push(ExportEntry {
                    exported: "default".to_string(),
                    target: ExportTarget::Function,
                });
            }
        } else {
            for name in declared {
                module.exports.push(ExportEntry {
                    exported: name.clone(),
                    target: ExportTarget::Local(name),
                });
            }
        }
        return;
    }

    if let Some(value) = node.child_by_field_name("value") {
        let value = unwrap_expression(&value);
        let target = match value.kind() {
            "class" => {
                let index = push_class(&value, source, None, Some("default"), module);
                ExportTarget::Class(index)
            }
            "identifier" => ExportTarget::Local(node_text(&value, source).to_string()),
            "function_expression" | "function" | "arrow_function" | "generator_function" => {
                ExportTarget::Function
            }
            _ => ExportTarget::Value,
        };
        module.exports.push(ExportEntry {
            exported: "default".to_string(),
            target,
        });
        return;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();

    if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
        let mut inner = clause.walk();
        for specifier in clause.named_children(&mut inner) {
            if specifier.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = specifier
                .child_by_field_name("name")
                .map(|n| module_export_name(&n, source))
            else {
                continue;
            };
            let exported = specifier
                .child_by_field_name("alias")
                .map(|a| module_export_name(&a, source))
                .unwrap_or_else(|| name.clone());
            let target = match &from {
                Some(specifier) => ExportTarget::ReExport {
                    specifier: specifier.clone(),
                    imported: Imported::from_export_name(&name),
                },
                None => ExportTarget::Local(name),
            };
            module.exports.push(ExportEntry { exported, target });
        }
        return;
    }

    if let Some(namespace) = children.iter().find(|c| c.kind() == "namespace_export") {
        let mut inner = namespace.walk();
        let exported = namespace
            .named_children(&mut inner)
            .last()
            .map(|n| module_export_name(&n, source));
        if let (Some(exported), Some(specifier)) = (exported, from) {
            module.exports.push(ExportEntry {
                exported,
                target: ExportTarget::ReExport {
                    specifier,
                    imported: Imported::Namespace,
                },
            });
        }
        return;
    }

    if let Some(specifier) = from {
        module.star_exports.push(specifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parser::{parse_source, ModuleVariant};
    use indoc::indoc;
    use std::path::Path;

    fn extract(source: &str) -> ParsedModule {
        let parsed = parse_source(source, Path::new("/p/m.js"), ModuleVariant::JavaScript).unwrap();
        extract_module(&parsed)
    }

    fn extract_ts(source: &str) -> ParsedModule {
        let parsed = parse_source(source, Path::new("/p/m.ts"), ModuleVariant::TypeScript).unwrap();
        extract_module(&parsed)
    }

    #[test]
    fn test_exported_class_with_static_field() {
        let module = extract(indoc! {r#"
            import { Shape } from './shape.js';
            export class Circle extends Shape {
                static typeName = "circle";
                constructor(radius) { super(); this.radius = radius; }
            }
        "#});

        assert_eq!(module.classes.len(), 1);
        let circle = &module.classes[0];
        assert_eq!(circle.name, "Circle");
        assert_eq!(circle.heritage, Some(Heritage::Identifier("Shape".into())));
        assert_eq!(
            circle.statics.get("typeName"),
            Some(&StaticValue::String("circle".into()))
        );
        assert_eq!(circle.line, 2);
        assert_eq!(
            module.imports.get("Shape"),
            Some(&ImportBinding {
                specifier: "./shape.js".into(),
                imported: Imported::Named("Shape".into()),
            })
        );
        assert_eq!(
            module.export("Circle").map(|e| &e.target),
            Some(&ExportTarget::Local("Circle".into()))
        );
    }

    #[test]
    fn test_static_assignment_after_class() {
        let module = extract(indoc! {r#"
            class Square extends Shape {}
            Square.typeName = 'square';
            export { Square as Box };
        "#});

        assert_eq!(
            module.classes[0].statics.get("typeName"),
            Some(&StaticValue::String("square".into()))
        );
        assert_eq!(
            module.export("Box").map(|e| &e.target),
            Some(&ExportTarget::Local("Square".into()))
        );
    }

    #[test]
    fn test_static_getter_and_non_string_values() {
        let module = extract(indoc! {r#"
            export class A {
                static get typeName() { return `a`; }
                static version = 2;
                static flag = true;
                static missing;
                instanceField = "ignored";
            }
        "#});

        let statics = &module.classes[0].statics;
        assert_eq!(statics.get("typeName"), Some(&StaticValue::String("a".into())));
        assert_eq!(statics.get("version"), Some(&StaticValue::Number("2".into())));
        assert_eq!(statics.get("flag"), Some(&StaticValue::Boolean(true)));
        assert_eq!(statics.get("missing"), Some(&StaticValue::Undefined));
        assert!(!statics.contains_key("instanceField"));
    }

    #[test]
    fn test_class_expression_and_namespace_heritage() {
        let module = extract(indoc! {r#"
            import * as shapes from './shapes.js';
            export const Oval = class extends shapes.Shape {};
            export default class extends shapes.Shape {}
        "#});

        assert_eq!(module.classes.len(), 2);
        assert_eq!(module.classes[0].name, "Oval");
        assert_eq!(
            module.classes[0].heritage,
            Some(Heritage::Member {
                object: "shapes".into(),
                property: "Shape".into(),
            })
        );
        assert_eq!(module.classes[1].name, "default");
        assert_eq!(
            module.export("default").map(|e| &e.target),
            Some(&ExportTarget::Class(1))
        );
        assert_eq!(
            module.imports.get("shapes").map(|i| &i.imported),
            Some(&Imported::Namespace)
        );
    }

    #[test]
    fn test_re_exports() {
        let module = extract(indoc! {r#"
            export { Circle, default as Square } from './circle.js';
            export * from './more.js';
        "#});

        assert_eq!(
            module.export("Square").map(|e| &e.target),
            Some(&ExportTarget::ReExport {
                specifier: "./circle.js".into(),
                imported: Imported::Default,
            })
        );
        assert_eq!(module.star_exports, vec!["./more.js".to_string()]);
    }

    #[test]
    fn test_functions_and_values() {
        let module = extract(indoc! {r#"
            export function helper() {}
            export const answer = 42;
            export const make = () => null;
        "#});

        assert_eq!(module.bindings.get("helper"), Some(&LocalBinding::Function));
        assert_eq!(module.bindings.get("answer"), Some(&LocalBinding::Value));
        assert_eq!(module.bindings.get("make"), Some(&LocalBinding::Function));
        assert!(module.classes.is_empty());
    }

    #[test]
    fn test_source_mapping_url_comment() {
        let module = extract("export class A {}\n//# sourceMappingURL=a.js.map\n");
        assert_eq!(module.source_mapping_url.as_deref(), Some("a.js.map"));
    }

    #[test]
    fn test_typescript_abstract_and_extends_clause() {
        let module = extract_ts(indoc! {r#"
            import { Shape } from './shape.js';
            export abstract class Polygon extends Shape {
                static readonly typeName: string = "polygon";
            }
            export class Triangle extends Polygon implements Drawable {
                static typeName = "triangle";
            }
        "#});

        assert_eq!(module.classes.len(), 2);
        assert!(module.classes[0].is_abstract);
        assert_eq!(
            module.classes[0].statics.get("typeName"),
            Some(&StaticValue::String("polygon".into()))
        );
        assert_eq!(
            module.classes[1].heritage,
            Some(Heritage::Identifier("Polygon".into()))
        );
        assert!(!module.classes[1].is_abstract);
    }

    #[test]
    fn test_string_escapes() {
        let module = extract(r#"export class A { static typeName = "a\"bA"; }"#);
        assert_eq!(
            module.classes[0].statics.get("typeName"),
            Some(&StaticValue::String("a\"bA".into()))
        );
    }
}
