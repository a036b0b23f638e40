// --- File: crates/patitas_social/src/models.rs ---
//! Like-record document shape.
//!
//! Each user has at most one document in the `likes` collection, holding a
//! `liked` map keyed by post id. A `true` entry is a live like; an explicit
//! null is a tombstone left behind by an unlike. Absence and null read the
//! same, but the tombstone matters for writes: the post's aggregate counter
//! is only ever mutated in lockstep with an entry transition, so a removal
//! must overwrite the entry rather than drop the key.

use std::collections::BTreeSet;

use patitas_common::services::Document;
use serde_json::Value;

/// Collection with one like-record document per user.
pub const LIKES: &str = "likes";
/// Collection holding feed posts with their denormalized `likes` counter.
pub const POSTS: &str = "publicaciones";

/// Dotted field path of one like-map entry.
pub fn like_path(post_id: &str) -> String {
    format!("liked.{post_id}")
}

/// The post ids a like-record currently marks as liked.
///
/// Tombstoned (null) and non-`true` entries are skipped.
pub fn liked_ids(doc: &Document) -> BTreeSet<String> {
    doc.fields
        .get("liked")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter(|(_, value)| value.as_bool() == Some(true))
                .map(|(post_id, _)| post_id.clone())
                .collect()
        })
        .unwrap_or_default()
}
