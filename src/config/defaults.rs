//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "Documentation".into()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use super::super::OutputFormat;
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn input() -> PathBuf {
        "docs".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub fn format() -> OutputFormat {
        OutputFormat::default()
    }

    pub fn ignore() -> Vec<String> {
        Vec::new()
    }

    pub fn workers() -> usize {
        50
    }
}
