//! Asset container export
//!
//! The pipeline hands a finished [`ExportBundle`] to this boundary; the GLB
//! codec serializes it into a single-file binary glTF container. Writes are
//! all-or-nothing: a failed export never leaves a partial output file.

mod glb;

use std::path::{Path, PathBuf};

use crate::Result;
use crate::material::MaterialGraph;
use crate::mesh::Mesh;

pub use glb::{GlbExportOptions, export_glb};

/// Everything the exporter needs: the final mesh and its bound material.
/// The texture reference rides inside the material graph. Exists only
/// transiently at the pipeline's end.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub mesh: Mesh,
    pub material: MaterialGraph,
}

/// Output path derived from the input path: extension replaced with `.glb`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("glb")
}

/// Write `bytes` to a sibling temporary file, then rename onto `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let Some(name) = path.file_name() else {
        return Err(crate::Error::Export(format!(
            "output path {} has no file name",
            path.display()
        )));
    };
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(err) = std::fs::write(&tmp, bytes) {
        std::fs::remove_file(&tmp).ok();
        return Err(err.into());
    }
    if let Err(err) = std::fs::rename(&tmp, path) {
        std::fs::remove_file(&tmp).ok();
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("art/logo.svg")),
            PathBuf::from("art/logo.glb")
        );
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("logoforge_atomic_probe.bin");
        write_atomic(&path, b"payload").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        assert!(!dir.join("logoforge_atomic_probe.bin.tmp").exists());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_atomic_rejects_bare_root() {
        assert!(write_atomic(Path::new("/"), b"payload").is_err());
    }
}
