//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when the static gallery directory is missing and make sure the
/// directory holding the captions file exists.
pub async fn ensure_env(static_dir: &str, captions_file: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(%static_dir, "static gallery directory not found; assets will 404");
    }
    if let Some(data_dir) = captions_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    Ok(())
}
