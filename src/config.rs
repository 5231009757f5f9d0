//! Optional TOML configuration.
//!
//! ```toml
//! source = "../deps/go.mod"
//! target = "app/go.mod"
//! dependency = "cosmos-sdk"
//! package = "chain/app"
//! ```
//!
//! Every key is optional. Relative `source` and `target` paths are taken
//! relative to the directory holding the config file.

use crate::error::{Result, SyncError};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

const KNOWN_KEYS: &[&str] = &["source", "target", "dependency", "package"];

/// Where to find the two manifests, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Explicit source manifest.
    pub source: Option<PathBuf>,
    /// Explicit target manifest.
    pub target: Option<PathBuf>,
    /// `<X>` in `../../dependencies/<X>/go.mod`.
    pub dependency: Option<String>,
    /// `<Y>/<Z>` in `../../packages/<Y>/<Z>/go.mod`.
    pub package: Option<String>,
}

impl Settings {
    /// Loads settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        log::debug!("Loading config: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| SyncError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml(&content, base, path)
    }

    /// Parses settings from TOML text. `base` anchors relative paths and
    /// `origin` names the file in error messages.
    pub fn from_toml(content: &str, base: &Path, origin: &Path) -> Result<Self> {
        let doc = content.parse::<DocumentMut>()?;
        let mut settings = Settings::default();

        for (key, item) in doc.as_table().iter() {
            let value = || {
                item.as_str().ok_or_else(|| {
                    SyncError::Config(origin.to_path_buf(), format!("'{}' must be a string", key))
                })
            };

            match key {
                "source" => settings.source = Some(base.join(value()?)),
                "target" => settings.target = Some(base.join(value()?)),
                "dependency" => settings.dependency = Some(value()?.to_string()),
                "package" => settings.package = Some(value()?.to_string()),
                other => {
                    return Err(SyncError::Config(
                        origin.to_path_buf(),
                        format!(
                            "unknown key '{}' (expected one of: {})",
                            other,
                            KNOWN_KEYS.join(", ")
                        ),
                    ));
                }
            }
        }

        Ok(settings)
    }

    /// Returns `self` with every value set in `over` replaced by it.
    pub fn overlay(self, over: Settings) -> Settings {
        Settings {
            source: over.source.or(self.source),
            target: over.target.or(self.target),
            dependency: over.dependency.or(self.dependency),
            package: over.package.or(self.package),
        }
    }
}
