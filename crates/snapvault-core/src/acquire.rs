use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{bail, Context};
use url::Url;

use crate::record::MediaRecord;

/// Terminal result of acquiring one record. No retries, no re-entry.
#[derive(Debug)]
pub enum Outcome {
    /// Destination already existed; no network call was made.
    Skipped,
    /// Fetched and written to the destination.
    Downloaded,
    /// Existence check, transport, or write failed.
    Failed(String),
}

/// Download `record` to `dest` unless it is already there.
///
/// The bare existence check is the dedup index; a truncated file from an
/// earlier failed download is indistinguishable from a complete one.
pub fn acquire(agent: &ureq::Agent, record: &MediaRecord, dest: &Path) -> Outcome {
    match std::fs::metadata(dest) {
        Ok(_) => return Outcome::Skipped,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Outcome::Failed(format!("stat {}: {err}", dest.display())),
    }

    match download(agent, &record.media_url, dest) {
        Ok(()) => Outcome::Downloaded,
        Err(err) => Outcome::Failed(format!("{err:#}")),
    }
}

/// One GET, body streamed straight into the destination file.
fn download(agent: &ureq::Agent, media_url: &str, dest: &Path) -> anyhow::Result<()> {
    let parsed = Url::parse(media_url).with_context(|| format!("invalid media URL {media_url:?}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("unsupported URL scheme in {media_url:?}");
    }

    let mut response = agent
        .get(media_url)
        .call()
        .with_context(|| format!("GET {media_url}"))?;
    let status = response.status().as_u16();
    if status >= 400 {
        bail!("HTTP {status} fetching {media_url}");
    }

    let mut out = io::BufWriter::new(
        File::create(dest).with_context(|| format!("creating {}", dest.display()))?,
    );
    io::copy(&mut response.body_mut().as_reader(), &mut out)
        .with_context(|| format!("writing {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch;
    use crate::record::{Category, MediaKind};
    use std::io::{Read, Write};

    fn record(url: &str) -> MediaRecord {
        MediaRecord {
            category: Category::Story,
            id: "abc".to_string(),
            index: String::new(),
            media_url: url.to_string(),
            kind: MediaKind::Image,
            timestamp_secs: None,
        }
    }

    /// Serve one canned HTTP response on a loopback port, then stop.
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 2048];
                let _ = stream.read(&mut request);
                let header = format!(
                    "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://{addr}/media")
    }

    #[test]
    fn existing_destination_is_skipped_without_network() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("abc-.png");
        std::fs::write(&dest, b"already here").expect("seed");

        // A dead URL proves no request is attempted.
        let record = record("http://127.0.0.1:9/unreachable");
        let outcome = acquire(&fetch::build_agent(), &record, &dest);
        assert!(matches!(outcome, Outcome::Skipped));
        assert_eq!(std::fs::read(&dest).expect("read"), b"already here");
    }

    #[test]
    fn successful_download_writes_fetched_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("abc-.png");
        let url = serve_once("HTTP/1.1 200 OK", b"png bytes");

        let outcome = acquire(&fetch::build_agent(), &record(&url), &dest);
        assert!(matches!(outcome, Outcome::Downloaded), "{outcome:?}");
        assert_eq!(std::fs::read(&dest).expect("read"), b"png bytes");
    }

    #[test]
    fn non_success_status_fails_the_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("abc-.png");
        let url = serve_once("HTTP/1.1 404 Not Found", b"");

        let outcome = acquire(&fetch::build_agent(), &record(&url), &dest);
        match outcome {
            Outcome::Failed(reason) => assert!(reason.contains("404"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn invalid_media_url_fails_without_panicking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("abc-.png");

        let outcome = acquire(&fetch::build_agent(), &record("not a url"), &dest);
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn second_acquire_skips_what_the_first_downloaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("abc-.png");
        let url = serve_once("HTTP/1.1 200 OK", b"bytes");
        let agent = fetch::build_agent();

        let first = acquire(&agent, &record(&url), &dest);
        assert!(matches!(first, Outcome::Downloaded), "{first:?}");

        // The server is gone; only the existence check keeps this green.
        let second = acquire(&agent, &record(&url), &dest);
        assert!(matches!(second, Outcome::Skipped), "{second:?}");
    }
}
