//! Calibre ebook search and reading progress.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::MediaManager;
use crate::core::store::Query;
use crate::core::store::query::text_contains;
use crate::domains::tools::{ToolResult, ToolSpec, to_payload};

pub const SEARCH_CALIBRE: ToolSpec = ToolSpec::new(
    "search_calibre_library",
    "Search the Calibre ebook library by title or author, optionally filtered by author and genre.",
);

pub const READING_PROGRESS: ToolSpec = ToolSpec::new(
    "get_reading_progress",
    "Get reading progress for books, optionally for one book or reading status.",
);

#[derive(Debug, Clone, Serialize)]
struct Book {
    calibre_id: &'static str,
    title: &'static str,
    author: &'static str,
    genre: &'static [&'static str],
    year: u16,
    pages: u32,
    rating: f64,
    format: &'static str,
    size_mb: f64,
}

static BOOKS: &[Book] = &[
    Book {
        calibre_id: "dune_1965",
        title: "Dune",
        author: "Frank Herbert",
        genre: &["Science Fiction"],
        year: 1965,
        pages: 688,
        rating: 4.5,
        format: "EPUB",
        size_mb: 2.1,
    },
    Book {
        calibre_id: "neuromancer_1984",
        title: "Neuromancer",
        author: "William Gibson",
        genre: &["Science Fiction", "Cyberpunk"],
        year: 1984,
        pages: 271,
        rating: 4.2,
        format: "EPUB",
        size_mb: 1.3,
    },
    Book {
        calibre_id: "three_body_2006",
        title: "The Three-Body Problem",
        author: "Cixin Liu",
        genre: &["Science Fiction"],
        year: 2006,
        pages: 400,
        rating: 4.7,
        format: "EPUB",
        size_mb: 1.8,
    },
    Book {
        calibre_id: "radetzkymarsch_1932",
        title: "Radetzkymarsch",
        author: "Joseph Roth",
        genre: &["Historical Fiction"],
        year: 1932,
        pages: 432,
        rating: 4.4,
        format: "EPUB",
        size_mb: 1.6,
    },
];

/// Reading status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    All,
    Reading,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
struct Progress {
    book_id: &'static str,
    title: &'static str,
    author: &'static str,
    status: ReadingStatus,
    current_page: u32,
    total_pages: u32,
    percentage: u8,
    last_read: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_completion: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    review: Option<&'static str>,
}

static PROGRESS: &[Progress] = &[
    Progress {
        book_id: "dune_1965",
        title: "Dune",
        author: "Frank Herbert",
        status: ReadingStatus::Reading,
        current_page: 234,
        total_pages: 688,
        percentage: 34,
        last_read: "2025-12-14T19:15:00Z",
        estimated_completion: Some("2025-12-20"),
        review: None,
    },
    Progress {
        book_id: "neuromancer_1984",
        title: "Neuromancer",
        author: "William Gibson",
        status: ReadingStatus::Completed,
        current_page: 271,
        total_pages: 271,
        percentage: 100,
        last_read: "2025-12-10T22:30:00Z",
        estimated_completion: None,
        review: Some("Mind-bending cyberpunk classic"),
    },
];

fn default_limit() -> usize {
    10
}

/// Parameters for `search_calibre_library`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BookSearchParams {
    /// Text to find in title or author (case-insensitive).
    pub query: String,

    /// Author filter (substring).
    pub author: Option<String>,

    /// Genre filter (substring of any genre).
    pub genre: Option<String>,

    /// Maximum results.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Parameters for `get_reading_progress`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ReadingProgressParams {
    /// Calibre id of one book.
    pub book_id: Option<String>,

    /// Reading status filter.
    #[serde(default)]
    pub status: ReadingStatus,
}

impl MediaManager {
    pub async fn search_calibre_library(self: Arc<Self>, params: BookSearchParams) -> ToolResult {
        let books = Query::new()
            .filter_opt(params.author, |b: &Book, author| text_contains(b.author, author))
            .filter_opt(params.genre, |b: &Book, genre| {
                b.genre.iter().any(|g| text_contains(g, genre))
            })
            .filter(|b: &Book| {
                text_contains(b.title, &params.query) || text_contains(b.author, &params.query)
            })
            .limit(params.limit)
            .apply(BOOKS);

        info!("Searched Calibre library: {} books found", books.len());
        to_payload(&books)
    }

    pub async fn get_reading_progress(self: Arc<Self>, params: ReadingProgressParams) -> ToolResult {
        let status = params.status;
        let progress = Query::new()
            .filter_opt(params.book_id, |p: &Progress, id| p.book_id == id.as_str())
            .filter(move |p: &Progress| status == ReadingStatus::All || p.status == status)
            .apply(PROGRESS);

        info!("Retrieved reading progress for {} books", progress.len());
        to_payload(&progress)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::manager;
    use super::*;

    fn search(query: &str) -> BookSearchParams {
        BookSearchParams {
            query: query.into(),
            author: None,
            genre: None,
            limit: 10,
        }
    }

    #[tokio::test]
    async fn test_search_matches_title_or_author() {
        let by_author = manager().search_calibre_library(search("gibson")).await.unwrap();
        assert_eq!(by_author[0]["title"], "Neuromancer");

        let by_title = manager().search_calibre_library(search("DUNE")).await.unwrap();
        assert_eq!(by_title.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_genre_filter_checks_every_genre() {
        let params = BookSearchParams {
            genre: Some("cyberpunk".into()),
            ..search("")
        };
        let books = manager().search_calibre_library(params).await.unwrap();
        assert_eq!(books.as_array().unwrap().len(), 1);
        assert_eq!(books[0]["calibre_id"], "neuromancer_1984");
    }

    #[tokio::test]
    async fn test_reading_progress_filters() {
        let reading = manager()
            .get_reading_progress(ReadingProgressParams {
                book_id: None,
                status: ReadingStatus::Reading,
            })
            .await
            .unwrap();
        assert_eq!(reading.as_array().unwrap().len(), 1);
        assert_eq!(reading[0]["status"], "reading");

        let unknown = manager()
            .get_reading_progress(ReadingProgressParams {
                book_id: Some("missing".into()),
                status: ReadingStatus::All,
            })
            .await
            .unwrap();
        assert!(unknown.as_array().unwrap().is_empty());
    }
}
