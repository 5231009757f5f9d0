use crate::error::{Result, SyncError};
use crate::modfile::{self, Manifest};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Permission bits for manifests this tool creates.
pub const MANIFEST_MODE: u32 = 0o644;

/// Reads and parses the go.mod at `path`.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    log::debug!("Reading manifest: {}", path.display());

    let data = fs::read(path).map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    modfile::parse(&data).map_err(|e| SyncError::Parse {
        path: path.to_path_buf(),
        line: e.pos.line,
        column: e.pos.column,
        message: e.message,
    })
}

/// Renders `manifest` for writing to `path`.
pub fn render_manifest(manifest: &Manifest, path: &Path) -> Result<Vec<u8>> {
    manifest
        .format()
        .map_err(|message| SyncError::Format {
            path: path.to_path_buf(),
            message,
        })
}

/// Overwrites `path` with `content` in place.
///
/// The file is truncated and rewritten directly, without a temporary file.
/// A new file is created with [`MANIFEST_MODE`] on Unix.
pub fn write_manifest(path: &Path, content: &[u8]) -> Result<()> {
    let to_write_error = |source: std::io::Error| SyncError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(MANIFEST_MODE);
    }

    let mut file = options.open(path).map_err(to_write_error)?;
    file.write_all(content).map_err(to_write_error)?;
    file.flush().map_err(to_write_error)?;

    log::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
