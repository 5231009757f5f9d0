//! Manifest path resolution.
//!
//! Without explicit paths, both manifests are found at fixed offsets from
//! the directory holding the running executable:
//!
//! ```text
//! <exe dir>/../../dependencies/<dependency>/go.mod   (source)
//! <exe dir>/../../packages/<package>/go.mod          (target)
//! ```

use crate::config::Settings;
use crate::error::{Result, SyncError};
use crate::validation::validate_layout_dir;
use std::path::{Component, Path, PathBuf};

pub const MANIFEST_FILE: &str = "go.mod";
pub const DEPENDENCIES_ROOT: &str = "../../dependencies";
pub const PACKAGES_ROOT: &str = "../../packages";

/// Absolute locations of the two manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPaths {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl ManifestPaths {
    /// Resolves both paths, consulting the executable location only when a
    /// path was not given explicitly.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        Self::resolve_with(settings, executable_dir)
    }

    pub fn resolve_with(
        settings: &Settings,
        exe_dir: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let needs_exe = (settings.source.is_none() && settings.dependency.is_some())
            || (settings.target.is_none() && settings.package.is_some());
        let base = if needs_exe { Some(exe_dir()?) } else { None };

        let source = match (&settings.source, &settings.dependency, &base) {
            (Some(path), _, _) => absolute(path)?,
            (None, Some(name), Some(base)) => {
                validate_layout_dir(name, "--dependency", 1)?;
                normalize(&base.join(DEPENDENCIES_ROOT).join(name).join(MANIFEST_FILE))
            }
            _ => {
                return Err(SyncError::PathResolution(
                    "no source manifest: pass --source or --dependency".to_string(),
                ));
            }
        };

        let target = match (&settings.target, &settings.package, &base) {
            (Some(path), _, _) => absolute(path)?,
            (None, Some(dir), Some(base)) => {
                validate_layout_dir(dir, "--package", 2)?;
                normalize(&base.join(PACKAGES_ROOT).join(dir).join(MANIFEST_FILE))
            }
            _ => {
                return Err(SyncError::PathResolution(
                    "no target manifest: pass --target or --package".to_string(),
                ));
            }
        };

        log::debug!("Source manifest: {}", source.display());
        log::debug!("Target manifest: {}", target.display());
        Ok(Self { source, target })
    }
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .and_then(|p| p.canonicalize())
        .map_err(|e| SyncError::PathResolution(format!("cannot locate executable: {}", e)))?;

    parent_dir(&exe)
}

fn parent_dir(exe: &Path) -> Result<PathBuf> {
    let dir = exe
        .parent()
        .filter(|dir| dir.is_absolute())
        .ok_or_else(|| anyhow::anyhow!("Failed to find parent of {}", exe.display()))?;
    Ok(dir.to_path_buf())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).map_err(|e| {
        SyncError::PathResolution(format!("cannot make {} absolute: {}", path.display(), e))
    })?;
    Ok(normalize(&abs))
}

/// Removes `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(dir: &'static str) -> impl FnOnce() -> Result<PathBuf> {
        move || Ok(PathBuf::from(dir))
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/opt/tools/bin/../../dependencies/x/go.mod")),
            PathBuf::from("/opt/dependencies/x/go.mod")
        );
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_conventional_layout() {
        let settings = Settings {
            dependency: Some("sdk".to_string()),
            package: Some("chain/app".to_string()),
            ..Default::default()
        };

        let paths = ManifestPaths::resolve_with(&settings, fixed("/repo/build/bin")).unwrap();
        assert_eq!(paths.source, PathBuf::from("/repo/dependencies/sdk/go.mod"));
        assert_eq!(paths.target, PathBuf::from("/repo/packages/chain/app/go.mod"));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_paths_skip_executable_lookup() {
        let settings = Settings {
            source: Some(PathBuf::from("/x/dep/go.mod")),
            target: Some(PathBuf::from("/x/app/../app/go.mod")),
            ..Default::default()
        };

        let paths = ManifestPaths::resolve_with(&settings, || {
            Err(SyncError::PathResolution("should not be called".to_string()))
        })
        .unwrap();
        assert_eq!(paths.source, PathBuf::from("/x/dep/go.mod"));
        assert_eq!(paths.target, PathBuf::from("/x/app/go.mod"));
    }

    #[test]
    fn test_relative_explicit_path_becomes_absolute() {
        let settings = Settings {
            source: Some(PathBuf::from("dep/go.mod")),
            target: Some(PathBuf::from("app/go.mod")),
            ..Default::default()
        };
        let paths = ManifestPaths::resolve_with(&settings, fixed("/unused")).unwrap();
        assert!(paths.source.is_absolute());
        assert!(paths.target.ends_with("app/go.mod"));
    }

    #[test]
    fn test_missing_source() {
        let settings = Settings {
            package: Some("a/b".to_string()),
            ..Default::default()
        };
        let err = ManifestPaths::resolve_with(&settings, fixed("/bin")).unwrap_err();
        assert!(err.to_string().contains("pass --source or --dependency"));
    }

    #[test]
    fn test_missing_target() {
        let settings = Settings {
            dependency: Some("x".to_string()),
            ..Default::default()
        };
        let err = ManifestPaths::resolve_with(&settings, fixed("/bin")).unwrap_err();
        assert!(err.to_string().contains("pass --target or --package"));
    }

    #[test]
    fn test_executable_lookup_failure_is_fatal() {
        let settings = Settings {
            dependency: Some("x".to_string()),
            package: Some("a/b".to_string()),
            ..Default::default()
        };
        let err = ManifestPaths::resolve_with(&settings, || {
            Err(SyncError::PathResolution("cannot locate executable".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, SyncError::PathResolution(_)));
    }

    #[test]
    fn test_layout_names_are_validated() {
        let settings = Settings {
            dependency: Some("../escape".to_string()),
            package: Some("a/b".to_string()),
            ..Default::default()
        };
        let err = ManifestPaths::resolve_with(&settings, fixed("/bin")).unwrap_err();
        assert!(err.to_string().contains("invalid --dependency"));
    }

    #[cfg(unix)]
    #[test]
    fn test_root_has_no_parent() {
        let err = parent_dir(Path::new("/")).unwrap_err();
        assert!(matches!(err, SyncError::Other(_)));
        assert!(err.to_string().contains("Failed to find parent of /"));
    }

    #[test]
    fn test_executable_dir_is_absolute() {
        assert!(executable_dir().unwrap().is_absolute());
    }
}
