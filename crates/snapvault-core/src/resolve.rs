use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::record::{Category, MediaRecord};

/// Deterministic destination for a record:
/// `<output>/<username>/<category>[/<DD-MM-YYYY>]/<id>-<index><ext>`.
///
/// Story snaps bucket by the UTC calendar date of their timestamp; the
/// payload carries bare Unix seconds with no zone attached. Snaps without a
/// usable timestamp land in `date-unknown/`.
pub fn dest_path(output_root: &Path, username: &str, record: &MediaRecord) -> PathBuf {
    let mut dir = output_root.join(username).join(record.category.dir_name());

    if record.category == Category::Story {
        let bucket = record
            .timestamp_secs
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.format("%d-%m-%Y").to_string())
            .unwrap_or_else(|| "date-unknown".to_string());
        dir = dir.join(bucket);
    }

    let filename = format!("{}-{}{}", record.id, record.index, record.kind.extension());
    dir.join(filename)
}

/// Create the directory levels above `path`. Idempotent.
pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Create the four per-category directories for a user up front. Idempotent;
/// the story date subfolders are still created on demand.
pub fn bootstrap_user_dirs(output_root: &Path, username: &str) -> anyhow::Result<()> {
    for category in Category::ALL {
        fs::create_dir_all(output_root.join(username).join(category.dir_name()))?;
    }
    Ok(())
}
