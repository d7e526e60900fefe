//! Well-known symbol names recognized by the extension scanner.
//!
//! The vocabulary is fixed: extension-providing symbols are identified by these
//! qualified names only, never by user configuration.

/// Universal top type; every symbol is a subtype of it.
pub const UNIVERSAL_TOP: &str = "java.lang.Object";

/// Marker attribute tagging a symbol as an extension provider.
pub const EXTENSION_MARKER: &str = "hudson.Extension";
/// Marker attribute carrying one or more alias names.
pub const ALIAS_MARKER: &str = "org.jenkinsci.Symbol";

/// Supertype of step descriptors.
pub const STEP_DESCRIPTOR: &str = "org.jenkinsci.plugins.workflow.steps.StepDescriptor";
/// Supertype of injectable global variables.
pub const GLOBAL_VARIABLE: &str = "org.jenkinsci.plugins.workflow.cps.GlobalVariable";

/// Base type of compiled pipeline scripts.
pub const SCRIPT_BASE: &str = "groovy.lang.Script";
/// Base type of test specifications.
pub const SPECIFICATION_BASE: &str = "spock.lang.Specification";
/// Base type of closures generated for script and test bodies.
pub const CLOSURE_BASE: &str = "groovy.lang.Closure";

const SCAFFOLDING_TYPES: &[&str] = &[SCRIPT_BASE, SPECIFICATION_BASE, CLOSURE_BASE];

/// Returns the harness scaffolding supertypes excluded from every query.
pub fn scaffolding_types() -> &'static [&'static str] {
    SCAFFOLDING_TYPES
}

/// Returns whether `name` is one of the harness scaffolding base types.
pub fn is_scaffolding_type(name: &str) -> bool {
    SCAFFOLDING_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::{is_scaffolding_type, scaffolding_types, CLOSURE_BASE, STEP_DESCRIPTOR};

    #[test]
    fn scaffolding_types_cover_script_spec_and_closure() {
        assert_eq!(scaffolding_types().len(), 3);
        assert!(is_scaffolding_type(CLOSURE_BASE));
        assert!(is_scaffolding_type("spock.lang.Specification"));
        assert!(!is_scaffolding_type(STEP_DESCRIPTOR));
    }
}
