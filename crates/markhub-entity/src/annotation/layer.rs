//! Annotation layer entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's full set of per-page vector scenes for a file.
///
/// There is exactly one record per (file, user) pair, fully replaced on
/// each save. The `revision` field is an optimistic concurrency token:
/// a save must carry the revision the client read, and a stale revision
/// is rejected so that concurrent writers cannot silently discard each
/// other's pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationLayer {
    /// The file this layer annotates.
    pub file_id: Uuid,
    /// The authoring user's identifier.
    pub user: String,
    /// Optimistic concurrency token. 0 for a layer that has never been
    /// saved; incremented on every successful save.
    pub revision: i64,
    /// Map of 0-based page index to that page's serialized vector scene.
    ///
    /// Scenes are opaque JSON at this level; only the rasterizer parses
    /// them. A `BTreeMap` keeps page iteration order deterministic.
    pub pages: BTreeMap<u32, serde_json::Value>,
    /// When the layer was last saved. `None` until the first save.
    pub updated_at: Option<DateTime<Utc>>,
}

impl AnnotationLayer {
    /// The empty-but-valid layer returned for a user who has never saved.
    ///
    /// This is a default, not an error, so that clients can always do a
    /// read-merge-write cycle without special-casing first saves.
    pub fn empty(file_id: Uuid, user: impl Into<String>) -> Self {
        Self {
            file_id,
            user: user.into(),
            revision: 0,
            pages: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// Whether this layer has any authored pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
