// --- File: crates/patitas_social/src/logic.rs ---

use std::collections::BTreeSet;
use std::sync::Arc;

use patitas_common::error::HttpStatusCode;
use patitas_common::services::{BoxedError, DocumentStore, FieldOp, WriteOp};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{like_path, liked_ids, LIKES, POSTS};

#[derive(Error, Debug)]
pub enum SocialError {
    #[error("No authenticated user for this call.")]
    Unauthenticated,
    #[error("Store unavailable: {0}")]
    Infrastructure(#[from] BoxedError),
}

impl HttpStatusCode for SocialError {
    fn status_code(&self) -> u16 {
        match self {
            SocialError::Unauthenticated => 401,
            SocialError::Infrastructure(_) => 502,
        }
    }
}

/// Like-toggle workflow.
///
/// Every toggle mutates the post's denormalized `likes` counter and the
/// user's like-map entry in one atomic batch, so the two documents never
/// drift apart through this path. Removal writes an explicit null tombstone
/// into the map instead of deleting the key.
pub struct LikeWorkflow {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
}

impl LikeWorkflow {
    pub fn new(store: Arc<dyn DocumentStore<Error = BoxedError>>) -> Self {
        Self { store }
    }

    /// Flip the like relation between `user_id` and `post_id`.
    ///
    /// `currently_liked` is the caller's view of the current state. On
    /// removal that view is re-verified against the store first; if the user
    /// does not actually hold a like, the call is a defensive no-op that
    /// returns `false` and mutates nothing. Every other resolution returns
    /// `true`.
    pub async fn toggle_like(
        &self,
        user_id: &str,
        post_id: &str,
        currently_liked: bool,
    ) -> Result<bool, SocialError> {
        if user_id.is_empty() {
            return Err(SocialError::Unauthenticated);
        }

        let like_record = self.store.get(LIKES, user_id).await?;

        if currently_liked {
            // Removing: only trust the caller after the store agrees,
            // otherwise a stale UI would decrement a counter it never
            // incremented.
            let actually_liked = like_record
                .as_ref()
                .is_some_and(|doc| liked_ids(doc).contains(post_id));
            if !actually_liked {
                warn!(
                    "Ignoring unlike of {} by {}: no like on record",
                    post_id, user_id
                );
                return Ok(false);
            }

            self.store
                .atomic_batch(vec![
                    WriteOp::UpdateFields {
                        collection: POSTS.to_string(),
                        key: post_id.to_string(),
                        ops: vec![FieldOp::increment("likes", -1)],
                    },
                    WriteOp::UpdateFields {
                        collection: LIKES.to_string(),
                        key: user_id.to_string(),
                        ops: vec![FieldOp::set(like_path(post_id), Value::Null)],
                    },
                ])
                .await?;
            debug!("{} unliked {}", user_id, post_id);
            return Ok(true);
        }

        // Adding: first-ever like creates the record inside the same batch.
        let map_write = match like_record {
            Some(_) => WriteOp::UpdateFields {
                collection: LIKES.to_string(),
                key: user_id.to_string(),
                ops: vec![FieldOp::set(like_path(post_id), true)],
            },
            None => WriteOp::Set {
                collection: LIKES.to_string(),
                key: user_id.to_string(),
                fields: [(
                    "liked".to_string(),
                    Value::Object(serde_json::Map::from_iter([(
                        post_id.to_string(),
                        Value::Bool(true),
                    )])),
                )]
                .into_iter()
                .collect(),
            },
        };

        self.store
            .atomic_batch(vec![
                WriteOp::UpdateFields {
                    collection: POSTS.to_string(),
                    key: post_id.to_string(),
                    ops: vec![FieldOp::increment("likes", 1)],
                },
                map_write,
            ])
            .await?;
        debug!("{} liked {}", user_id, post_id);
        Ok(true)
    }

    /// Whether `user_id` currently likes `post_id`.
    ///
    /// Absent records, absent entries, and tombstoned entries all read as
    /// not-liked.
    pub async fn is_liked(&self, user_id: &str, post_id: &str) -> Result<bool, SocialError> {
        let doc = self.store.get(LIKES, user_id).await?;
        Ok(doc.is_some_and(|doc| liked_ids(&doc).contains(post_id)))
    }

    /// All post ids `user_id` currently likes.
    pub async fn liked_post_ids(&self, user_id: &str) -> Result<BTreeSet<String>, SocialError> {
        let doc = self.store.get(LIKES, user_id).await?;
        Ok(doc.map(|doc| liked_ids(&doc)).unwrap_or_default())
    }
}
