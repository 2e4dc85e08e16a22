//! Emission plans and the printers that turn them into source text.
//!
//! A plan is built eagerly as an ordered list of nodes; printing never calls
//! back into discovery.

pub mod banner;
pub mod typescript;

use thiserror::Error;

pub use typescript::TypeScriptEmitter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment {
    /// `// text`
    Line(String),
    /// `/* ... */`, one line per text line.
    Block(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    pub imported: String,
    pub local: Option<String>,
}

impl ImportName {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            imported: name.into(),
            local: None,
        }
    }

    pub fn aliased(imported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            imported: imported.into(),
            local: Some(local.into()),
        }
    }
}

/// Key of an entry in the constant mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableKey {
    String(String),
    Number(String),
    Boolean(bool),
    Null,
    Undefined,
    /// Arbitrary expression, emitted as a computed key.
    Computed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub key: TableKey,
    pub value: String,
}

/// The dispatcher: one static `create` forwarding trailing arguments to the
/// constructor found in the mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    pub name: String,
    pub parameter: String,
    pub key_type: String,
    pub return_type: String,
    pub table: String,
    pub error_class: String,
    /// Caveat attached to the spread-constructor cast.
    pub spread_caveat: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Import {
        specifier: String,
        names: Vec<ImportName>,
    },
    ConstTable {
        name: String,
        entries: Vec<TableEntry>,
    },
    /// `type <name> = keyof typeof <table>;`
    KeyOf {
        name: String,
        table: String,
        exported: bool,
    },
    TypeAlias {
        name: String,
        target: String,
        exported: bool,
    },
    ErrorClass {
        name: String,
        extends: String,
    },
    Dispatcher(Dispatcher),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanNode {
    pub leading_comment: Option<Comment>,
    pub item: Item,
}

impl From<Item> for PlanNode {
    fn from(item: Item) -> Self {
        Self {
            leading_comment: None,
            item,
        }
    }
}

impl PlanNode {
    pub fn with_comment(item: Item, comment: Comment) -> Self {
        Self {
            leading_comment: Some(comment),
            item,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionPlan {
    /// Lines of the boxed banner printed before everything else.
    pub header: Vec<String>,
    pub nodes: Vec<PlanNode>,
}

impl EmissionPlan {
    pub fn push(&mut self, node: impl Into<PlanNode>) {
        self.nodes.push(node.into());
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("import from `{0}` names nothing")]
    EmptyImport(String),
}

/// Turns an emission plan into printed, syntactically valid source text.
pub trait CodeEmitter {
    fn emit(&self, plan: &EmissionPlan) -> Result<String, EmitError>;
}

/// Whether `name` can be written as a bare identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first == '$' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}
