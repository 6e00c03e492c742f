use serde_json::Value;

use crate::record::{Category, MediaKind, MediaRecord};

/// Monotonic fallback identity for payload entries that carry none.
/// Counted per extraction pass, so ids are deterministic for a given payload.
struct SyntheticIds {
    next: u32,
}

impl SyntheticIds {
    fn new() -> Self {
        Self { next: 0 }
    }

    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("unidentified-{:04}", self.next)
    }
}

/// Flatten the embedded payload into records, in fixed traversal order:
/// curated highlights, spotlight story metadata, spotlight highlights, story.
///
/// Absent or empty collections yield nothing for that category and are
/// reported informationally, never as errors.
pub fn extract_records(payload: &Value, username: &str) -> Vec<MediaRecord> {
    let null = Value::Null;
    let page = payload.pointer("/props/pageProps").unwrap_or(&null);
    let mut ids = SyntheticIds::new();
    let mut records = Vec::new();

    let curated = array_at(page, "/curatedHighlights");
    if curated.is_empty() {
        log::info!("user {username} has no curated highlights");
    }
    for group in curated {
        extract_curated_group(group, &mut ids, &mut records);
    }

    let spotlight_meta = array_at(page, "/spotlightStoryMetadata");
    if spotlight_meta.is_empty() {
        log::info!("user {username} has no spotlight story metadata");
    }
    for entry in spotlight_meta {
        records.push(MediaRecord {
            category: Category::SpotlightStory,
            id: non_empty(string_at(entry, "/videoMetadata/uploadDateMs"), &mut ids),
            index: String::new(),
            media_url: string_at(entry, "/videoMetadata/contentUrl"),
            kind: MediaKind::Video,
            timestamp_secs: None,
        });
    }

    let spotlight = array_at(page, "/spotlightHighlights");
    if spotlight.is_empty() {
        log::info!("user {username} has no spotlight highlights");
    }
    for group in spotlight {
        for item in array_at(group, "/snapList") {
            records.push(MediaRecord {
                category: Category::SpotlightHighlights,
                id: non_empty(string_at(item, "/snapId/value"), &mut ids),
                index: string_at(item, "/snapIndex"),
                media_url: string_at(item, "/snapUrls/mediaUrl"),
                kind: MediaKind::from_code(int_at(item, "/snapMediaType")),
                timestamp_secs: None,
            });
        }
    }

    let story = array_at(page, "/story/snapList");
    if story.is_empty() {
        log::info!("user {username} has no stories");
    }
    for item in story {
        records.push(MediaRecord {
            category: Category::Story,
            id: non_empty(string_at(item, "/snapId/value"), &mut ids),
            index: String::new(),
            media_url: string_at(item, "/snapUrls/mediaUrl"),
            kind: MediaKind::from_code(int_at(item, "/snapMediaType")),
            timestamp_secs: opt_int_at(item, "/timestampInSec/value"),
        });
    }

    records
}

/// Curated highlights reuse one group identity for every inner snap; the
/// `snapIndex` ordinal keeps their filenames apart.
fn extract_curated_group(group: &Value, ids: &mut SyntheticIds, records: &mut Vec<MediaRecord>) {
    let mut group_id = string_at(group, "/highlightId/value");
    if group_id.is_empty() {
        group_id = string_at(group, "/storyId/value");
    }
    let group_id = non_empty(group_id, ids);

    for item in array_at(group, "/snapList") {
        records.push(MediaRecord {
            category: Category::CuratedHighlights,
            id: group_id.clone(),
            index: string_at(item, "/snapIndex"),
            media_url: string_at(item, "/snapUrls/mediaUrl"),
            kind: MediaKind::from_code(int_at(item, "/snapMediaType")),
            timestamp_secs: None,
        });
    }
}

fn non_empty(id: String, ids: &mut SyntheticIds) -> String {
    if id.is_empty() {
        ids.next_id()
    } else {
        id
    }
}

fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// String field; numbers are accepted and rendered (payload fields flip
/// between the two representations).
fn string_at(value: &Value, pointer: &str) -> String {
    match value.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn int_at(value: &Value, pointer: &str) -> i64 {
    opt_int_at(value, pointer).unwrap_or(0)
}

fn opt_int_at(value: &Value, pointer: &str) -> Option<i64> {
    match value.pointer(pointer) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
