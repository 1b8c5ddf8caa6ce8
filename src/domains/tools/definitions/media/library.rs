//! Plex library: search, in-progress items and recent additions.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::MediaManager;
use crate::core::store::Query;
use crate::core::store::query::text_contains;
use crate::domains::tools::{DomainError, ToolResult, ToolSpec, to_payload};

pub const SEARCH_PLEX: ToolSpec = ToolSpec::new(
    "search_plex_library",
    "Search the Plex library for movies, TV shows and music by title.",
);

pub const CURRENTLY_WATCHING: ToolSpec = ToolSpec::new(
    "get_currently_watching",
    "Get items currently being watched or read across Plex and Calibre.",
);

pub const RECENTLY_ADDED: ToolSpec = ToolSpec::new(
    "get_recently_added",
    "Get media added across Plex, Calibre and Immich within the last N days.",
);

/// Media type filter. `all` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    All,
    Movie,
    Tv,
    Music,
    Book,
    Photo,
}

impl MediaType {
    fn admits(self, kind: MediaType) -> bool {
        self == MediaType::All || self == kind
    }
}

#[derive(Debug, Clone, Serialize)]
struct PlexItem {
    title: &'static str,
    #[serde(rename = "type")]
    kind: MediaType,
    year: u16,
    genre: &'static [&'static str],
    rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seasons: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    episodes: Option<u16>,
    credit: &'static str,
    plex_url: &'static str,
    available: bool,
}

static PLEX_LIBRARY: &[PlexItem] = &[
    PlexItem {
        title: "Inception",
        kind: MediaType::Movie,
        year: 2010,
        genre: &["Sci-Fi", "Thriller"],
        rating: 8.8,
        duration: Some("148 min"),
        seasons: None,
        episodes: None,
        credit: "Christopher Nolan",
        plex_url: "plex://movie/inception",
        available: true,
    },
    PlexItem {
        title: "Breaking Bad",
        kind: MediaType::Tv,
        year: 2008,
        genre: &["Crime", "Drama", "Thriller"],
        rating: 9.5,
        duration: None,
        seasons: Some(5),
        episodes: Some(62),
        credit: "Vince Gilligan",
        plex_url: "plex://tv/breaking-bad",
        available: true,
    },
    PlexItem {
        title: "The Expanse",
        kind: MediaType::Tv,
        year: 2015,
        genre: &["Drama", "Mystery", "Sci-Fi"],
        rating: 8.5,
        duration: None,
        seasons: Some(6),
        episodes: Some(62),
        credit: "Mark Fergus",
        plex_url: "plex://tv/the-expanse",
        available: true,
    },
    PlexItem {
        title: "Wiener Blut",
        kind: MediaType::Music,
        year: 1873,
        genre: &["Classical", "Waltz"],
        rating: 9.0,
        duration: Some("9 min"),
        seasons: None,
        episodes: None,
        credit: "Johann Strauss II",
        plex_url: "plex://music/wiener-blut",
        available: true,
    },
];

#[derive(Debug, Clone, Serialize)]
struct InProgress {
    title: &'static str,
    #[serde(rename = "type")]
    kind: MediaType,
    service: &'static str,
    progress: &'static str,
    percentage: u8,
    last_activity: &'static str,
    up_next: Option<&'static str>,
}

static IN_PROGRESS: &[InProgress] = &[
    InProgress {
        title: "The Expanse",
        kind: MediaType::Tv,
        service: "Plex",
        progress: "Season 4, Episode 3 of 6",
        percentage: 50,
        last_activity: "2025-12-14T20:30:00Z",
        up_next: Some("S4E4 - Godspeed"),
    },
    InProgress {
        title: "Dune",
        kind: MediaType::Book,
        service: "Calibre",
        progress: "Page 234 of 688",
        percentage: 34,
        last_activity: "2025-12-14T19:15:00Z",
        up_next: None,
    },
    InProgress {
        title: "Stranger Things",
        kind: MediaType::Tv,
        service: "Plex",
        progress: "Season 3, Episode 8 of 8",
        percentage: 100,
        last_activity: "2025-12-13T22:45:00Z",
        up_next: None,
    },
];

#[derive(Debug, Clone, Serialize)]
struct RecentItem {
    title: &'static str,
    #[serde(rename = "type")]
    kind: MediaType,
    service: &'static str,
    added_date: &'static str,
    detail: &'static str,
}

impl RecentItem {
    fn added_at(&self) -> Option<DateTime<Utc>> {
        self.added_date.parse().ok()
    }
}

static RECENTLY_ADDED_ITEMS: &[RecentItem] = &[
    RecentItem {
        title: "Oppenheimer",
        kind: MediaType::Movie,
        service: "Plex",
        added_date: "2025-12-13T10:30:00Z",
        detail: "Biography, Drama, History (2023)",
    },
    RecentItem {
        title: "The Three-Body Problem",
        kind: MediaType::Book,
        service: "Calibre",
        added_date: "2025-12-12T14:20:00Z",
        detail: "Cixin Liu, 400 pages",
    },
    RecentItem {
        title: "Christmas Market Photos",
        kind: MediaType::Photo,
        service: "Immich",
        added_date: "2025-12-14T16:45:00Z",
        detail: "Album Vienna 2025, 47 photos",
    },
];

fn default_search_limit() -> usize {
    10
}

fn default_watching_limit() -> usize {
    5
}

fn default_days() -> i64 {
    7
}

fn default_recent_limit() -> usize {
    20
}

/// Parameters for `search_plex_library`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PlexSearchParams {
    /// Text to find in titles (case-insensitive).
    pub query: String,

    /// Media type filter.
    #[serde(default)]
    pub media_type: MediaType,

    /// Maximum results.
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

/// Parameters for `get_currently_watching`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CurrentlyWatchingParams {
    /// Maximum items.
    #[serde(default = "default_watching_limit")]
    pub limit: usize,
}

/// Parameters for `get_recently_added`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecentlyAddedParams {
    /// Media type filter.
    #[serde(default)]
    pub media_type: MediaType,

    /// Days to look back.
    #[serde(default = "default_days")]
    pub days: i64,

    /// Maximum items.
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
}

impl MediaManager {
    pub async fn search_plex_library(self: Arc<Self>, params: PlexSearchParams) -> ToolResult {
        let media_type = params.media_type;
        let results = Query::new()
            .filter(move |item: &PlexItem| media_type.admits(item.kind))
            .filter(|item: &PlexItem| text_contains(item.title, &params.query))
            .limit(params.limit)
            .apply(PLEX_LIBRARY);

        info!("Searched Plex library for '{}': {} results", params.query, results.len());
        to_payload(&results)
    }

    pub async fn get_currently_watching(self: Arc<Self>, params: CurrentlyWatchingParams) -> ToolResult {
        let results = Query::new().limit(params.limit).apply(IN_PROGRESS);

        info!("Retrieved {} currently watching items", results.len());
        to_payload(&results)
    }

    pub async fn get_recently_added(self: Arc<Self>, params: RecentlyAddedParams) -> ToolResult {
        if params.days < 0 {
            return Err(DomainError::validation("days must be zero or more"));
        }
        let cutoff = Duration::try_days(params.days)
            .and_then(|window| self.clock.utc().checked_sub_signed(window))
            .ok_or_else(|| DomainError::validation(format!("days {} is out of range", params.days)))?;
        let media_type = params.media_type;

        let results = Query::new()
            .filter(move |item: &RecentItem| media_type.admits(item.kind))
            .filter(move |item: &RecentItem| item.added_at().is_some_and(|at| at >= cutoff))
            .limit(params.limit)
            .apply(RECENTLY_ADDED_ITEMS);

        info!("Retrieved {} recently added {:?} items", results.len(), media_type);
        to_payload(&results)
    }
}
