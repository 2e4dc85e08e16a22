//! Deciding what an exported class means to one registry.

use crate::loader::{ClassInfo, Superclass};

#[derive(Debug, Clone)]
pub enum Classification<'a> {
    /// A true subtype of the base; register it.
    Specialisation,
    /// A subtype declared `abstract`; never instantiated by a factory.
    Abstract,
    /// Not a subtype, but some ancestor carries the base's name. Worth a
    /// warning, never a registration.
    NameMatch { ancestor: &'a Superclass },
    Unrelated,
}

/// Classify `class` against `base`. Identity decides membership; the name
/// comparison only feeds the advisory warning.
pub fn classify<'a>(class: &'a ClassInfo, base: &ClassInfo) -> Classification<'a> {
    if class.is_subtype_of(&base.id) {
        if class.is_abstract {
            return Classification::Abstract;
        }
        return Classification::Specialisation;
    }
    match class
        .ancestors()
        .find(|ancestor| ancestor.name() == base.name)
    {
        Some(ancestor) => Classification::NameMatch { ancestor },
        None => Classification::Unrelated,
    }
}
