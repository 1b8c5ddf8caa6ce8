//! Cross-library playlists.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use super::MediaManager;
use crate::core::store::Query;
use crate::domains::records::Playlist;
use crate::domains::tools::{ToolResult, ToolSpec, to_payload};

pub const CREATE_PLAYLIST: ToolSpec = ToolSpec::new(
    "create_media_playlist",
    "Create a playlist of media items from Plex, Calibre or Immich.",
);

pub const LIST_PLAYLISTS: ToolSpec = ToolSpec::new(
    "get_media_playlists",
    "Get saved media playlists in creation order.",
);

/// Parameters for `create_media_playlist`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreatePlaylistParams {
    /// Playlist name.
    pub name: String,

    /// Media item ids (at least one).
    pub media_items: Vec<String>,

    /// Optional description.
    pub description: Option<String>,
}

/// Parameters for `get_media_playlists`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListPlaylistsParams {
    /// Maximum playlists to return.
    pub limit: Option<usize>,
}

impl MediaManager {
    pub async fn create_media_playlist(self: Arc<Self>, params: CreatePlaylistParams) -> ToolResult {
        let playlist = self
            .playlists
            .create(Playlist {
                id: 0,
                name: params.name,
                description: params.description,
                media_items: params.media_items,
                created_at: self.clock.utc(),
            })
            .await?;

        info!(
            "Created media playlist '{}' with {} items",
            playlist.name,
            playlist.media_items.len()
        );
        Ok(json!({
            "success": true,
            "playlist": playlist,
            "item_count": playlist.media_items.len(),
            "message": format!("Playlist '{}' created successfully", playlist.name),
        }))
    }

    pub async fn get_media_playlists(self: Arc<Self>, params: ListPlaylistsParams) -> ToolResult {
        let playlists = self.playlists.query(Query::new().limit(params.limit)).await;

        info!("Retrieved {} media playlists", playlists.len());
        to_payload(&playlists)
    }
}
