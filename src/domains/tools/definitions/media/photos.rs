//! Immich photo search and recent photos.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::MediaManager;
use crate::core::store::Query;
use crate::core::store::query::{text_contains, text_eq, within};
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, to_payload};

pub const SEARCH_PHOTOS: ToolSpec = ToolSpec::new(
    "search_immich_photos",
    "Search Immich photos by description or tag, date range and person.",
);

pub const RECENT_PHOTOS: ToolSpec = ToolSpec::new(
    "get_recent_photos",
    "Get Immich photos taken within the last N days, newest first, optionally for one album or person.",
);

#[derive(Debug, Clone, Serialize)]
struct Photo {
    id: &'static str,
    filename: &'static str,
    description: &'static str,
    date_taken: &'static str,
    album: &'static str,
    location: &'static str,
    tags: &'static [&'static str],
    people: &'static [&'static str],
    url: &'static str,
}

impl Photo {
    fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.date_taken.parse().ok()
    }

    fn taken_on(&self) -> Option<NaiveDate> {
        self.taken_at().map(|at| at.date_naive())
    }
}

static PHOTOS: &[Photo] = &[
    Photo {
        id: "photo_001",
        filename: "christmas_market_2025.jpg",
        description: "Beautiful Christmas market in Vienna with decorated trees",
        date_taken: "2025-12-14T17:30:00Z",
        album: "Christmas 2025",
        location: "Stephansplatz, Vienna",
        tags: &["christmas", "market", "vienna", "lights"],
        people: &["Sandra"],
        url: "immich://photo/photo_001",
    },
    Photo {
        id: "photo_002",
        filename: "cafe_central_2025.jpg",
        description: "Traditional Viennese coffee house atmosphere",
        date_taken: "2025-12-13T15:45:00Z",
        album: "Vienna Cafés",
        location: "Café Central, Vienna",
        tags: &["cafe", "vienna", "coffee", "traditional"],
        people: &[],
        url: "immich://photo/photo_002",
    },
    Photo {
        id: "photo_003",
        filename: "snowy_stephansdom.jpg",
        description: "St. Stephen's Cathedral covered in fresh snow",
        date_taken: "2025-12-14T08:15:00Z",
        album: "Winter Vienna 2025",
        location: "Stephansplatz, Vienna",
        tags: &["snow", "cathedral", "winter", "vienna"],
        people: &[],
        url: "immich://photo/photo_003",
    },
    Photo {
        id: "photo_004",
        filename: "benny_walk.jpg",
        description: "Morning walk with Benny in the park",
        date_taken: "2025-12-10T07:30:00Z",
        album: "Benny Adventures",
        location: "Stadtpark, Vienna",
        tags: &["dog", "park", "morning"],
        people: &["Sandra"],
        url: "immich://photo/photo_004",
    },
];

fn default_limit() -> usize {
    20
}

fn default_recent_days() -> i64 {
    7
}

/// Parameters for `search_immich_photos`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PhotoSearchParams {
    /// Text to find in the description or a tag.
    pub query: Option<String>,

    /// Taken on or after this date (YYYY-MM-DD).
    #[schemars(with = "Option<String>")]
    pub date_from: Option<NaiveDate>,

    /// Taken on or before this date (YYYY-MM-DD).
    #[schemars(with = "Option<String>")]
    pub date_to: Option<NaiveDate>,

    /// Person shown in the photo.
    pub person: Option<String>,

    /// Maximum results.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Parameters for `get_recent_photos`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecentPhotosParams {
    /// Days to look back.
    #[serde(default = "default_recent_days")]
    pub days: i64,

    /// Album name (case-insensitive).
    pub album: Option<String>,

    /// Person shown in the photo.
    pub person: Option<String>,

    /// Maximum photos.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for RecentPhotosParams {
    fn default() -> Self {
        Self {
            days: default_recent_days(),
            album: None,
            person: None,
            limit: default_limit(),
        }
    }
}

impl MediaManager {
    pub async fn search_immich_photos(self: Arc<Self>, params: PhotoSearchParams) -> ToolResult {
        let (from, to) = (params.date_from, params.date_to);
        let photos = Query::new()
            .filter_opt(params.query, |p: &Photo, query| {
                text_contains(p.description, query) || p.tags.iter().any(|t| text_contains(t, query))
            })
            .filter(move |p: &Photo| p.taken_on().is_some_and(|on| within(on, from, to)))
            .filter_opt(params.person, |p: &Photo, person| {
                p.people.iter().any(|name| text_eq(name, person))
            })
            .limit(params.limit)
            .apply(PHOTOS);

        info!("Searched Immich photos: {} results", photos.len());
        to_payload(&photos)
    }

    pub async fn get_recent_photos(self: Arc<Self>, params: RecentPhotosParams) -> ToolResult {
        if params.days < 0 {
            return Err(DomainError::validation("days must be zero or more"));
        }
        let cutoff = Duration::try_days(params.days)
            .and_then(|window| self.clock.utc().checked_sub_signed(window))
            .ok_or_else(|| DomainError::validation(format!("days {} is out of range", params.days)))?;

        let photos = Query::new()
            .filter(move |p: &Photo| p.taken_at().is_some_and(|at| at >= cutoff))
            .filter_opt(params.album, |p: &Photo, album| text_eq(p.album, album))
            .filter_opt(params.person, |p: &Photo, person| {
                p.people.iter().any(|name| text_eq(name, person))
            })
            .order_by(|a: &Photo, b: &Photo| b.taken_at().cmp(&a.taken_at()))
            .limit(params.limit)
            .apply(PHOTOS);

        info!("Retrieved {} photos from the last {} days", photos.len(), params.days);
        to_payload(&photos)
    }
}
