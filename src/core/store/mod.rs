//! Entity storage.
//!
//! - `entity_store.rs` - generic CRUD store ([`EntityStore`]) and the [`Entity`] trait
//! - `query.rs` - filter/order/limit builder shared with static catalogues
//! - `snapshot.rs` - JSON snapshot persistence behind the [`TableSink`] seam
//! - `error.rs` - [`StoreError`]

mod entity_store;
mod error;
pub mod query;
mod snapshot;

pub use entity_store::{Entity, EntityStore};
pub use error::{StoreError, StoreResult};
pub use query::Query;
pub use snapshot::{JsonSnapshot, TableSink};
