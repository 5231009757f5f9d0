//! Validation rules for layout names given on the command line or in a
//! config file.
//!
//! Pure functions with no I/O or side effects.

use crate::error::{Result, SyncError};
use std::path::{Component, Path};

/// Validates a directory name used under the conventional layout roots.
///
/// ## Rules
/// - Not empty
/// - Relative path (not absolute)
/// - Not `.` or `..`
/// - No `..` components (path traversal)
/// - Exactly `components` normal components
pub fn validate_layout_dir(value: &str, flag: &str, components: usize) -> Result<()> {
    let invalid = |reason: String| {
        Err(SyncError::PathResolution(format!(
            "invalid {} '{}': {}",
            flag, value, reason
        )))
    };

    if value.trim().is_empty() {
        return invalid("cannot be empty".to_string());
    }

    if value == "." || value == ".." {
        return invalid("cannot use '.' or '..'".to_string());
    }

    let path = Path::new(value);
    if path.is_absolute() || value.starts_with('/') || value.starts_with('\\') {
        return invalid("must be a relative path".to_string());
    }

    let mut depth = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => return invalid("contains '..'".to_string()),
            Component::RootDir | Component::Prefix(_) => {
                return invalid("must be a relative path".to_string());
            }
        }
    }

    if depth != components {
        return invalid(format!(
            "expected {} path component{}, found {}",
            components,
            if components == 1 { "" } else { "s" },
            depth
        ));
    }

    Ok(())
}
