//! Extension categories and their name-extraction rules.

use crate::symbol::model::MarkerKind;
use crate::symbol::vocabulary::{GLOBAL_VARIABLE, STEP_DESCRIPTOR, UNIVERSAL_TOP};

/// Instance property holding a step's function name.
pub const STEP_NAME_PROPERTY: &str = "functionName";
/// Instance property holding a global variable's name.
pub const GLOBAL_VARIABLE_NAME_PROPERTY: &str = "name";

/// Kind of extension point a symbol contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionCategory {
    Step,
    GlobalVariable,
    AliasSymbol,
}

impl ExtensionCategory {
    pub const ALL: [ExtensionCategory; 3] = [Self::Step, Self::GlobalVariable, Self::AliasSymbol];

    /// Required supertype.
    pub fn supertype(self) -> &'static str {
        match self {
            Self::Step => STEP_DESCRIPTOR,
            Self::GlobalVariable => GLOBAL_VARIABLE,
            Self::AliasSymbol => UNIVERSAL_TOP,
        }
    }

    /// Required marker.
    pub fn marker(self) -> MarkerKind {
        match self {
            Self::Step | Self::GlobalVariable => MarkerKind::Extension,
            Self::AliasSymbol => MarkerKind::Alias,
        }
    }

    /// Instance property read after construction; `None` when names come
    /// straight from the alias marker.
    pub fn name_property(self) -> Option<&'static str> {
        match self {
            Self::Step => Some(STEP_NAME_PROPERTY),
            Self::GlobalVariable => Some(GLOBAL_VARIABLE_NAME_PROPERTY),
            Self::AliasSymbol => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::GlobalVariable => "global_variable",
            Self::AliasSymbol => "alias_symbol",
        }
    }

    /// Human-facing subject used in failure summaries.
    pub fn subject(self) -> &'static str {
        match self {
            Self::Step => "function names of StepDescriptor symbols",
            Self::GlobalVariable => "names of GlobalVariable symbols",
            Self::AliasSymbol => "alias names of Symbol-marked symbols",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExtensionCategory;
    use crate::symbol::model::MarkerKind;
    use crate::symbol::vocabulary::UNIVERSAL_TOP;

    #[test]
    fn alias_symbols_need_only_the_alias_marker() {
        let category = ExtensionCategory::AliasSymbol;
        assert_eq!(category.supertype(), UNIVERSAL_TOP);
        assert_eq!(category.marker(), MarkerKind::Alias);
        assert_eq!(category.name_property(), None);
    }

    #[test]
    fn steps_and_variables_need_extension_marker() {
        for category in [ExtensionCategory::Step, ExtensionCategory::GlobalVariable] {
            assert_eq!(category.marker(), MarkerKind::Extension);
            assert!(category.name_property().is_some());
            assert_ne!(category.supertype(), UNIVERSAL_TOP);
        }
    }
}
