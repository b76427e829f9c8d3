use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::format::sanitize_filename;
use super::IngestError;

/// Stage uploaded bytes on disk under `staging_dir/<session>/`.
///
/// The stored name is `<file_id>_<sanitized original name>` so a crash
/// leaves self-describing files behind instead of opaque blobs.
pub fn stage_file(
    staging_dir: &Path,
    session_id: Uuid,
    file_id: Uuid,
    original_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, IngestError> {
    let session_dir = staging_dir.join(session_id.to_string());
    std::fs::create_dir_all(&session_dir)?;

    let safe_name = sanitize_filename(original_name);
    let path = session_dir.join(format!("{file_id}_{safe_name}"));
    std::fs::write(&path, bytes)?;

    Ok(path)
}

/// Read a staged file back for extraction.
pub fn read_staged(path: &Path) -> Result<Vec<u8>, IngestError> {
    Ok(std::fs::read(path)?)
}

/// Remove a session's staging directory. Missing directories are fine —
/// the sweep may race a manual cleanup.
pub fn remove_session_dir(staging_dir: &Path, session_id: Uuid) {
    let session_dir = staging_dir.join(session_id.to_string());
    if let Err(e) = std::fs::remove_dir_all(&session_dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(session = %session_id, "Failed to remove staging dir: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let session = Uuid::new_v4();
        let file_id = Uuid::new_v4();

        let path = stage_file(dir.path(), session, file_id, "bogen.pdf", b"%PDF-1.4").unwrap();
        assert!(path.starts_with(dir.path().join(session.to_string())));

        let bytes = read_staged(&path).unwrap();
        assert_eq!(bytes, b"%PDF-1.4");
    }

    #[test]
    fn staged_name_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let session = Uuid::new_v4();
        let file_id = Uuid::new_v4();

        let path = stage_file(dir.path(), session, file_id, "../../evil.pdf", b"x").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.contains(".."));
        assert!(name.starts_with(&file_id.to_string()));
    }

    #[test]
    fn remove_session_dir_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        let session = Uuid::new_v4();
        stage_file(dir.path(), session, Uuid::new_v4(), "a.txt", b"a").unwrap();

        remove_session_dir(dir.path(), session);
        assert!(!dir.path().join(session.to_string()).exists());
    }

    #[test]
    fn remove_missing_session_dir_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        remove_session_dir(dir.path(), Uuid::new_v4());
    }
}
