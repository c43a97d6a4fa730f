//! Whole-file replacement helpers.

use bastion_error::{BastionResult, StoreError, StoreErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `path` with `contents` via a sibling temp file and a rename.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> BastionResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp = path.with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), seq));

    tokio::fs::write(&temp, contents).await.map_err(|e| {
        StoreError::new(StoreErrorKind::FileWrite(format!("{}: {}", temp.display(), e)))
    })?;

    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(StoreError::new(StoreErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into());
    }

    tracing::trace!(path = %path.display(), bytes = contents.len(), "Replaced file");
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
pub(crate) async fn read_optional(path: &Path) -> BastionResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::new(StoreErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()),
    }
}
