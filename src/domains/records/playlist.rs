//! Cross-library media playlists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use super::require_text;
use crate::core::store::{Entity, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub media_items: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Playlist {
    const KIND: &'static str = "Playlist";
    const TABLE: &'static str = "playlists";
    type Update = Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, update: Infallible) {
        match update {}
    }

    fn validate(&self) -> StoreResult<()> {
        require_text("name", &self.name)?;
        if self.media_items.is_empty() {
            return Err(StoreError::validation("A playlist needs at least one media item"));
        }
        Ok(())
    }
}
