use serde::{Deserialize, Serialize};

/// The four media collections a profile payload can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Story,
    SpotlightStory,
    SpotlightHighlights,
    CuratedHighlights,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Story,
        Category::SpotlightStory,
        Category::SpotlightHighlights,
        Category::CuratedHighlights,
    ];

    /// Directory name under `<output>/<username>/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Story => "story",
            Category::SpotlightStory => "spotlightStory",
            Category::SpotlightHighlights => "spotlightHighlights",
            Category::CuratedHighlights => "curatedHighlights",
        }
    }
}

/// Media type code carried by the payload: 0 = image, 1 = video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown(i64),
}

impl MediaKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => MediaKind::Image,
            1 => MediaKind::Video,
            other => MediaKind::Unknown(other),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Image => ".png",
            MediaKind::Video => ".mp4",
            MediaKind::Unknown(_) => ".unknown",
        }
    }
}

/// One downloadable media item, flattened out of its source collection.
#[derive(Debug, Clone)]
pub struct MediaRecord {
    pub category: Category,
    /// Never empty; a synthetic fallback is assigned when the payload omits it.
    pub id: String,
    /// Ordinal within a highlight group; empty for categories without one.
    pub index: String,
    pub media_url: String,
    pub kind: MediaKind,
    /// Unix seconds, present only for story snaps (drives date bucketing).
    pub timestamp_secs: Option<i64>,
}

/// Per-user counters for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_expected: u64,
    pub newly_downloaded: u64,
    pub already_present: u64,
}
