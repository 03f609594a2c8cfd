//! Atomic whole-file replace (temp file + rename), grounded on
//! `casparian_mcp::jobs::store::atomic_write`.

use std::fs;
use std::path::Path;

use crate::error::FeedbackError;

pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FeedbackError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(".tmp_{}", uuid::Uuid::new_v4()));
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
