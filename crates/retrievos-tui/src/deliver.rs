//! Writing accepted exports to disk.

use std::path::{Path, PathBuf};

use retrievos_core::ExportArtifact;
use tracing::info;

/// Write `artifact` into `dir` under its own file name.
pub fn save(dir: &Path, artifact: &ExportArtifact) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, artifact.content.as_bytes())?;
    info!(path = %path.display(), rows = artifact.rows, "export written");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retrievos_core::{ExportDelivery, ExportFormat};

    use super::*;

    #[test]
    fn writes_under_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let artifact = ExportArtifact {
            file_name: "devices_2024-01-01.csv".into(),
            format: ExportFormat::Csv,
            delivery: ExportDelivery::Save,
            content: "host\nsw1".into(),
            rows: 1,
        };

        let path = save(&target, &artifact).unwrap();
        assert_eq!(path, target.join("devices_2024-01-01.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "host\nsw1");
    }
}
