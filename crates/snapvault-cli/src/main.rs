use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::bail;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use snapvault_core::{extract, fetch, materialize, resolve, users, UserStats};

#[derive(Parser)]
#[command(
    name = "snapvault",
    version,
    about = "Archive public story and spotlight media, skipping what is already on disk"
)]
struct Cli {
    /// Newline-delimited file of usernames to archive
    #[arg(long, env = "USER_FILE", conflicts_with = "user")]
    file: Option<PathBuf>,

    /// Username to archive, comma-separated for multiple users
    #[arg(long, env = "SNAP_USERS")]
    user: Option<String>,

    /// Output directory for archived media
    #[arg(short, long, env = "DOWNLOAD_DIR", default_value = ".")]
    output: PathBuf,

    /// Repeat the run every N minutes (0 = run once)
    #[arg(long, env = "INTERVAL", default_value_t = 0)]
    interval: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let usernames = if let Some(path) = &cli.file {
        users::users_from_file(path)?
    } else if let Some(list) = &cli.user {
        users::users_from_list(list)
    } else {
        bail!("specify usernames with --file or --user (or USER_FILE / SNAP_USERS)");
    };
    if usernames.is_empty() {
        bail!("no usernames to archive");
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    run_batch(&usernames, &cli.output);

    if cli.interval > 0 {
        let period = Duration::from_secs(cli.interval * 60);
        loop {
            eprintln!("Next run in {} minute(s)", cli.interval);
            if sleep_until_stopped(period, &stop) {
                break;
            }
            run_batch(&usernames, &cli.output);
        }
        log::info!("interrupted, exiting");
    }

    Ok(())
}

/// One full pass over all users. Per-user failures are logged and skipped;
/// the batch always runs to the end.
fn run_batch(usernames: &[String], output: &Path) {
    let started = Instant::now();
    let agent = fetch::build_agent();
    log::info!("starting run for {} user(s)", usernames.len());

    let mut summaries: Vec<(String, UserStats)> = Vec::new();
    for (position, username) in usernames.iter().enumerate() {
        if let Err(err) = resolve::bootstrap_user_dirs(output, username) {
            log::error!("failed to create directories for user {username}: {err:#}");
            continue;
        }

        let payload = match fetch::fetch_payload(&agent, username) {
            Ok(payload) => payload,
            Err(err) => {
                log::error!("failed to fetch data for user {username}: {err:#}");
                continue;
            }
        };
        let records = extract::extract_records(&payload, username);

        let bar = new_bar(records.len() as u64, position + 1, usernames.len(), username);
        let stats = materialize(&agent, username, output, &records, &|done, _total| {
            bar.set_position(done);
        });
        bar.finish_and_clear();

        summaries.push((username.clone(), stats));
    }

    log::info!("run complete");
    for (username, stats) in &summaries {
        eprintln!(
            "User {username}: {} new downloads, {} already existed.",
            stats.newly_downloaded, stats.already_present
        );
    }
    eprintln!("Run took {:.2}s", started.elapsed().as_secs_f64());
}

fn new_bar(total: u64, position: usize, user_count: usize, username: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} scraping {msg}")
            .unwrap(),
    );
    bar.set_message(format!("[{position}/{user_count}] {username}"));
    bar
}

/// Sleep through `period` in short slices so ctrl-c takes effect promptly.
/// Returns true when the stop flag was raised.
fn sleep_until_stopped(period: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + period;
    loop {
        if stop.load(Ordering::SeqCst) {
            return true;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        std::thread::sleep(remaining.min(Duration::from_secs(1)));
    }
}
