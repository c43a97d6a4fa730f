//! Append-only record of members seen joining.

use crate::IdentifierSet;
use crate::atomic::read_optional;
use bastion_core::Snowflake;
use bastion_error::{BastionResult, StoreError, StoreErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Newline-delimited file of every member identifier seen so far.
#[derive(Debug, Clone)]
pub struct SeenMembers {
    path: PathBuf,
}

impl SeenMembers {
    /// Snapshot file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Every recorded identifier.
    pub async fn load(&self) -> BastionResult<IdentifierSet> {
        let raw = read_optional(&self.path).await?;
        Ok(raw.map(|r| IdentifierSet::parse(&r)).unwrap_or_default())
    }

    /// Append identifiers not yet recorded. Returns how many were appended.
    #[instrument(skip(self, ids), fields(path = %self.path.display()))]
    pub async fn record<I>(&self, ids: I) -> BastionResult<usize>
    where
        I: IntoIterator<Item = Snowflake>,
    {
        let raw = read_optional(&self.path).await?.unwrap_or_default();
        let mut known = IdentifierSet::parse(&raw);
        let mut fresh = Vec::new();
        for id in ids {
            if known.insert(id.clone()) {
                fresh.push(id);
            }
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        let mut block = String::new();
        if !raw.is_empty() && !raw.ends_with('\n') {
            block.push('\n');
        }
        for id in &fresh {
            block.push_str(id.as_str());
            block.push('\n');
        }

        let write_err = |e: std::io::Error| {
            StoreError::new(StoreErrorKind::FileWrite(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        };
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_err)?;
        file.write_all(block.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        debug!(appended = fresh.len(), "Recorded seen members");
        Ok(fresh.len())
    }
}
