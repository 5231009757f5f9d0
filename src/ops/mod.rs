mod manifest;
mod transplant;

pub use manifest::{MANIFEST_MODE, read_manifest, render_manifest, write_manifest};
pub use transplant::{TransplantReport, transplant_replaces};
