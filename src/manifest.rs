//! File manifest loading for the headless binary.
//!
//! A manifest is a JSON array of [`FileRecord`]s, or an object with a
//! `files` array (the shape a paging backend returns).

use crate::model::{FileRecord, ManifestError};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestShape {
    Bare(Vec<FileRecord>),
    Wrapped { files: Vec<FileRecord> },
}

/// Parse manifest text. `path` is used only for error context.
pub fn parse_manifest(contents: &str, path: &Path) -> Result<Vec<FileRecord>, ManifestError> {
    let shape: ManifestShape =
        serde_json::from_str(contents).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let files = match shape {
        ManifestShape::Bare(files) | ManifestShape::Wrapped { files } => files,
    };
    debug!(path = %path.display(), count = files.len(), "Manifest parsed");
    Ok(files)
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Vec<FileRecord>, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileId, GroupId, ReviewState};
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("files.json")
    }

    #[test]
    fn parses_bare_array_with_defaults() {
        let files = parse_manifest(
            r#"[{"id": 1, "mime": "image/jpeg"}, {"id": 2, "mime": "video/mp4", "width": 1920, "height": 1080}]"#,
            &path(),
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, FileId::new(1));
        assert_eq!(files[0].review, ReviewState::Unreviewed);
        assert!(files[0].group_ids.is_empty());
        assert!(files[1].is_video());
        assert_eq!(files[1].dimensions(), Some((1920, 1080)));
    }

    #[test]
    fn parses_wrapped_object() {
        let files = parse_manifest(
            r#"{"files": [{"id": 7, "mime": "image/png", "group_ids": [3], "review": "flagged"}]}"#,
            &path(),
        )
        .unwrap();

        assert_eq!(files[0].group_ids, vec![GroupId::new(3)]);
        assert_eq!(files[0].review, ReviewState::Flagged);
    }

    #[test]
    fn invalid_json_reports_path() {
        let err = parse_manifest("{not json", &path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().contains("files.json"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_manifest(Path::new("/nonexistent/triage-view/files.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn load_manifest_reads_from_disk() {
        let path = std::env::temp_dir().join("triage_view_manifest_test.json");
        std::fs::write(&path, r#"[{"id": 11, "mime": "image/webp"}]"#).unwrap();

        let files = load_manifest(&path).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].mime, "image/webp");

        std::fs::remove_file(path).ok();
    }
}
