pub mod acquire;
pub mod extract;
pub mod fetch;
pub mod record;
pub mod resolve;
pub mod users;

use std::path::Path;

pub use acquire::Outcome;
pub use record::{Category, MediaKind, MediaRecord, UserStats};

/// Per-item progress callback: (completed, total).
pub type ProgressCallback<'a> = dyn Fn(u64, u64) + 'a;

/// Materialize a user's extracted records under `output`, one at a time:
/// existence check, download if absent, counter update, progress tick.
///
/// Per-record failures are logged and absorbed; they count as neither new
/// nor already-present, but still tick the progress callback so it reaches
/// the pre-computed total.
pub fn materialize(
    agent: &ureq::Agent,
    username: &str,
    output: &Path,
    records: &[MediaRecord],
    progress: &ProgressCallback<'_>,
) -> UserStats {
    let mut stats = UserStats {
        total_expected: records.len() as u64,
        ..UserStats::default()
    };

    for (done, record) in records.iter().enumerate() {
        if let MediaKind::Unknown(code) = record.kind {
            log::warn!("user {username}: unknown media type {code}, saving as .unknown");
        }

        let dest = resolve::dest_path(output, username, record);
        let outcome = match resolve::ensure_parent_dir(&dest) {
            Ok(()) => acquire::acquire(agent, record, &dest),
            Err(err) => Outcome::Failed(format!("{err:#}")),
        };

        match outcome {
            Outcome::Skipped => stats.already_present += 1,
            Outcome::Downloaded => stats.newly_downloaded += 1,
            Outcome::Failed(reason) => {
                log::error!("user {username}: {}: {reason}", record.media_url);
            }
        }

        progress(done as u64 + 1, stats.total_expected);
    }

    stats
}
