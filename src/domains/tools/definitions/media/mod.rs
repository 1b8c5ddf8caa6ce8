//! Media manager portmanteau.
//!
//! Plex, Calibre and Immich are read from a static catalogue; playlists are
//! kept in the Playlist store.
//!
//! - `library.rs` - Plex search, currently watching, recently added
//! - `books.rs` - Calibre search and reading progress
//! - `photos.rs` - Immich photo search and recent photos
//! - `playlists.rs` - cross-library playlists

mod books;
mod library;
mod photos;
mod playlists;

pub use books::{BookSearchParams, ReadingProgressParams, ReadingStatus};
pub use library::{CurrentlyWatchingParams, MediaType, PlexSearchParams, RecentlyAddedParams};
pub use photos::{PhotoSearchParams, RecentPhotosParams};
pub use playlists::{CreatePlaylistParams, ListPlaylistsParams};

use std::sync::Arc;

use crate::core::clock::SharedClock;
use crate::core::store::EntityStore;
use crate::domains::records::{Database, Playlist};
use crate::domains::tools::{Portmanteau, ToolError, ToolRegistry};

pub static MEDIA: Portmanteau = Portmanteau {
    name: "media_manager",
    description: "Plex movies and shows, Calibre ebooks, Immich photos and media playlists",
    categories: &["plex", "calibre", "immich", "playlists"],
};

/// Handlers for the media tools.
pub struct MediaManager {
    playlists: Arc<EntityStore<Playlist>>,
    clock: SharedClock,
}

impl MediaManager {
    pub fn new(db: &Database, clock: SharedClock) -> Self {
        Self {
            playlists: db.playlists.clone(),
            clock,
        }
    }
}

/// Register every media tool.
pub fn register_media_tools(registry: &mut ToolRegistry, manager: Arc<MediaManager>) -> Result<(), ToolError> {
    registry
        .portmanteau(&MEDIA)
        .register(library::SEARCH_PLEX, manager.clone(), MediaManager::search_plex_library)?
        .register(library::CURRENTLY_WATCHING, manager.clone(), MediaManager::get_currently_watching)?
        .register(library::RECENTLY_ADDED, manager.clone(), MediaManager::get_recently_added)?
        .register(books::SEARCH_CALIBRE, manager.clone(), MediaManager::search_calibre_library)?
        .register(books::READING_PROGRESS, manager.clone(), MediaManager::get_reading_progress)?
        .register(photos::SEARCH_PHOTOS, manager.clone(), MediaManager::search_immich_photos)?
        .register(photos::RECENT_PHOTOS, manager.clone(), MediaManager::get_recent_photos)?
        .register(playlists::CREATE_PLAYLIST, manager.clone(), MediaManager::create_media_playlist)?
        .register(playlists::LIST_PLAYLISTS, manager, MediaManager::get_media_playlists)?;
    Ok(())
}
