use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

/// Creates `dir` (and parents) unless it is blank.
pub async fn ensure_dir(dir: &str) -> Result<()> {
    if dir.trim().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(Path::new(dir))
        .await
        .with_context(|| format!("create {}", dir))
}
