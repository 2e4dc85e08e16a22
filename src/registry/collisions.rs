//! Grouping specialisations by discriminator and applying the tie-break.

use super::Specialisation;
use crate::emit::{is_identifier, TableEntry, TableKey};
use crate::loader::StaticValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which specialisation a duplicated discriminator dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The most recently added specialisation wins.
    #[default]
    LastWins,
    /// The earliest added specialisation wins.
    FirstWins,
    /// Generation fails.
    Fail,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWins => write!(f, "last-wins"),
            Self::FirstWins => write!(f, "first-wins"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// The property key JavaScript uses when `value` keys an object literal:
/// numbers in their canonical string form, `true`, `null` and so on.
/// `None` when the value is only known at runtime.
pub fn property_key(value: Option<&StaticValue>) -> Option<String> {
    match value {
        Some(StaticValue::String(s)) => Some(s.clone()),
        Some(StaticValue::Number(n)) => Some(canonical_number(n)),
        Some(StaticValue::Boolean(b)) => Some(b.to_string()),
        Some(StaticValue::Null) => Some("null".to_string()),
        Some(StaticValue::Undefined) | None => Some("undefined".to_string()),
        Some(StaticValue::Expression(_)) => None,
    }
}

/// Table key for a discriminator value; a missing value reads as `undefined`.
/// A value that is not a literal is read off the imported class itself.
pub fn table_key(value: Option<&StaticValue>, identifier: &str, property: &str) -> TableKey {
    match value {
        Some(StaticValue::String(s)) => TableKey::String(s.clone()),
        Some(StaticValue::Number(n)) => TableKey::Number(canonical_number(n)),
        Some(StaticValue::Boolean(b)) => TableKey::Boolean(*b),
        Some(StaticValue::Null) => TableKey::Null,
        Some(StaticValue::Undefined) | None => TableKey::Undefined,
        Some(StaticValue::Expression(_)) => TableKey::Computed(runtime_lookup(identifier, property)),
    }
}

fn runtime_lookup(identifier: &str, property: &str) -> String {
    if is_identifier(property) {
        format!("{}.{}", identifier, property)
    } else {
        let quoted = serde_json::to_string(property).unwrap_or_else(|_| format!("\"{}\"", property));
        format!("{}[{}]", identifier, quoted)
    }
}

/// `Number.prototype.toString` of a numeric literal as written in source
/// (`0x10`, `1_000`, `5n`, `-2.50`). Unparseable text is returned unchanged.
pub fn canonical_number(literal: &str) -> String {
    let text: String = literal
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .collect();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };
    let unsigned = unsigned.strip_suffix('n').unwrap_or(unsigned);

    let radix = match unsigned.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    let parsed = match radix {
        Some(radix) => u128::from_str_radix(&unsigned[2..], radix)
            .ok()
            .map(|v| v as f64),
        None => unsigned.parse::<f64>().ok(),
    };
    match parsed {
        Some(value) => js_number_string(if negative { -value } else { value }),
        None => literal.to_string(),
    }
}

fn js_number_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&value.abs()) {
        return format!("{}", value);
    }
    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => scientific,
    }
}

/// Indices of `specialisations` grouped by runtime property key, groups in
/// order of first appearance. Values only known at runtime are left out.
pub fn group_by_discriminator(
    specialisations: &[&Specialisation],
    property: &str,
) -> IndexMap<String, Vec<usize>> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (index, specialisation) in specialisations.iter().enumerate() {
        if let Some(key) = property_key(specialisation.class.static_value(property)) {
            groups.entry(key).or_default().push(index);
        }
    }
    groups
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum Slot {
    Static(String),
    Runtime(usize),
}

/// One table entry per runtime key. A duplicated key keeps the position and
/// spelling of its first occurrence; the policy picks the identifier.
pub fn build_table(
    specialisations: &[&Specialisation],
    identifiers: &[String],
    property: &str,
    policy: CollisionPolicy,
) -> Vec<TableEntry> {
    let mut table: IndexMap<Slot, TableEntry> = IndexMap::new();
    for (index, (specialisation, identifier)) in
        specialisations.iter().zip(identifiers).enumerate()
    {
        let value = specialisation.class.static_value(property);
        let slot = match property_key(value) {
            Some(key) => Slot::Static(key),
            None => Slot::Runtime(index),
        };
        match table.get_mut(&slot) {
            Some(entry) => {
                if policy != CollisionPolicy::FirstWins {
                    entry.value = identifier.clone();
                }
            }
            None => {
                table.insert(
                    slot,
                    TableEntry {
                        key: table_key(value, identifier, property),
                        value: identifier.clone(),
                    },
                );
            }
        }
    }
    table.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{ClassInfo, TypeId};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn specialisation(file: &str, name: &str, type_name: Option<&str>) -> Specialisation {
        let mut class = ClassInfo::new(TypeId::new(Path::new(file), name), name);
        if let Some(value) = type_name {
            class
                .statics
                .insert("typeName".into(), StaticValue::String(value.into()));
        }
        Specialisation {
            class: Arc::new(class),
            source_file: PathBuf::from(file),
            export_name: name.into(),
        }
    }

    #[test]
    fn test_grouping_detects_duplicates() {
        let a = specialisation("/p/a.js", "A", Some("circle"));
        let b = specialisation("/p/b.js", "B", Some("square"));
        let c = specialisation("/p/c.js", "C", Some("circle"));
        let all = [&a, &b, &c];

        let groups = group_by_discriminator(&all, "typeName");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["circle"], vec![0, 2]);
    }

    #[test]
    fn test_last_wins_keeps_first_position() {
        let a = specialisation("/p/a.js", "A", Some("circle"));
        let b = specialisation("/p/b.js", "B", Some("square"));
        let c = specialisation("/p/c.js", "C", Some("circle"));
        let all = [&a, &b, &c];
        let ids = vec!["id_a".to_string(), "id_b".to_string(), "id_c".to_string()];

        let table = build_table(&all, &ids, "typeName", CollisionPolicy::LastWins);
        let values: Vec<_> = table.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["id_c", "id_b"]);

        let table = build_table(&all, &ids, "typeName", CollisionPolicy::FirstWins);
        let values: Vec<_> = table.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["id_a", "id_b"]);
    }

    #[test]
    fn test_missing_discriminator_is_undefined() {
        let a = specialisation("/p/a.js", "A", None);
        assert_eq!(
            table_key(a.class.static_value("typeName"), "cls_a", "typeName"),
            TableKey::Undefined
        );
        assert_eq!(property_key(a.class.static_value("typeName")).as_deref(), Some("undefined"));
    }

    fn with_value(file: &str, name: &str, value: StaticValue) -> Specialisation {
        let mut class = ClassInfo::new(TypeId::new(Path::new(file), name), name);
        class.statics.insert("typeName".into(), value);
        Specialisation {
            class: Arc::new(class),
            source_file: PathBuf::from(file),
            export_name: name.into(),
        }
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(CollisionPolicy::default().to_string(), "last-wins");
        assert_eq!(CollisionPolicy::FirstWins.to_string(), "first-wins");
    }

    #[test]
    fn test_canonical_number_matches_javascript() {
        assert_eq!(canonical_number("5"), "5");
        assert_eq!(canonical_number("5.0"), "5");
        assert_eq!(canonical_number("0x10"), "16");
        assert_eq!(canonical_number("1_000"), "1000");
        assert_eq!(canonical_number("-2.50"), "-2.5");
        assert_eq!(canonical_number("-0"), "0");
        assert_eq!(canonical_number("7n"), "7");
        assert_eq!(canonical_number("1e21"), "1e+21");
        assert_eq!(canonical_number("0.0000001"), "1e-7");
        assert_eq!(canonical_number(".5"), "0.5");
    }

    #[test]
    fn test_number_and_string_with_same_key_collide() {
        let a = with_value("/p/a.js", "A", StaticValue::Number("5".into()));
        let b = with_value("/p/b.js", "B", StaticValue::String("5".into()));
        let c = with_value("/p/c.js", "C", StaticValue::Boolean(true));
        let d = with_value("/p/d.js", "D", StaticValue::String("true".into()));
        let all = [&a, &b, &c, &d];
        let ids: Vec<String> = ["id_a", "id_b", "id_c", "id_d"].iter().map(|s| s.to_string()).collect();

        let groups = group_by_discriminator(&all, "typeName");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["5"], vec![0, 1]);
        assert_eq!(groups["true"], vec![2, 3]);

        let table = build_table(&all, &ids, "typeName", CollisionPolicy::LastWins);
        assert_eq!(
            table,
            vec![
                TableEntry {
                    key: TableKey::Number("5".into()),
                    value: "id_b".into(),
                },
                TableEntry {
                    key: TableKey::Boolean(true),
                    value: "id_d".into(),
                },
            ]
        );
    }

    #[test]
    fn test_runtime_values_are_read_from_the_class() {
        let a = with_value("/p/a.js", "A", StaticValue::Expression("KIND".into()));
        let b = with_value("/p/b.js", "B", StaticValue::Expression("KIND".into()));
        let all = [&a, &b];
        let ids = vec!["cls_a".to_string(), "cls_b".to_string()];

        assert!(group_by_discriminator(&all, "typeName").is_empty());
        let table = build_table(&all, &ids, "typeName", CollisionPolicy::LastWins);
        let keys: Vec<_> = table.into_iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                TableKey::Computed("cls_a.typeName".into()),
                TableKey::Computed("cls_b.typeName".into()),
            ]
        );
        assert_eq!(
            table_key(Some(&StaticValue::Expression("K".into())), "cls_a", "type-name"),
            TableKey::Computed("cls_a[\"type-name\"]".into())
        );
    }
}
