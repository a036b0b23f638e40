// --- File: crates/patitas_adoption/src/guard.rs ---
//! Rate limit and duplicate guard.
//!
//! Decides, for a given user and action kind, whether a new submission is
//! admissible today and whether it duplicates an existing one. Both checks
//! are reads issued before any write; nothing serializes them against a
//! concurrent submission from the same user, so two near-simultaneous calls
//! can both pass. That race is an accepted limitation of the store's
//! read-then-act model, backstopped (if at all) by server-side rules.

use std::sync::Arc;

use chrono::Utc;
use patitas_common::services::{BoxedError, DocumentStore, FieldOp, Filter};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::models::{DailyCounter, ModelError};

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Store unavailable: {0}")]
    Store(#[from] BoxedError),
    #[error(transparent)]
    Malformed(#[from] ModelError),
}

/// Outcome of a daily-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitDecision {
    /// Whether one more submission is admissible right now.
    pub allowed: bool,
    /// Submissions counted against today so far.
    pub current_count: u32,
    /// True when the counter is missing or belongs to an earlier UTC day,
    /// i.e. the next recorded submission starts the day at 1.
    pub is_new_day: bool,
}

/// Admission guard for one rate-limited action kind.
///
/// The guard is configured with the guarded entity's collection and the
/// counter collection for its action kind, so each workflow gets its own
/// counter documents (one per user per action kind).
pub struct SubmissionGuard {
    store: Arc<dyn DocumentStore<Error = BoxedError>>,
    entity_collection: &'static str,
    counter_collection: &'static str,
    creator_field: &'static str,
}

impl SubmissionGuard {
    pub fn new(
        store: Arc<dyn DocumentStore<Error = BoxedError>>,
        entity_collection: &'static str,
        counter_collection: &'static str,
        creator_field: &'static str,
    ) -> Self {
        Self {
            store,
            entity_collection,
            counter_collection,
            creator_field,
        }
    }

    /// True if the user already has an entity scoped to `scope_key`.
    ///
    /// Runs as a read prior to any write; see the module docs for the
    /// concurrency caveat.
    pub async fn check_duplicate(
        &self,
        user_id: &str,
        scope_field: &str,
        scope_key: &str,
    ) -> Result<bool, GuardError> {
        let existing = self
            .store
            .query(
                self.entity_collection,
                vec![
                    Filter::equal(self.creator_field, user_id),
                    Filter::equal(scope_field, scope_key),
                ],
            )
            .await?;
        Ok(!existing.is_empty())
    }

    /// Read the user's counter and decide admission against `max_per_day`.
    pub async fn check_daily_limit(
        &self,
        user_id: &str,
        max_per_day: u32,
    ) -> Result<LimitDecision, GuardError> {
        let doc = self.store.get(self.counter_collection, user_id).await?;
        let Some(doc) = doc else {
            return Ok(LimitDecision {
                allowed: true,
                current_count: 0,
                is_new_day: true,
            });
        };

        let counter = DailyCounter::from_document(&doc)?;
        let today = Utc::now().date_naive();
        if counter.last_update.date_naive() != today {
            // Stale counter: a prior day's count never blocks today.
            debug!(
                "Counter for {} is stale ({} != {}), treating as zero",
                user_id,
                counter.last_update.date_naive(),
                today
            );
            return Ok(LimitDecision {
                allowed: true,
                current_count: 0,
                is_new_day: true,
            });
        }

        Ok(LimitDecision {
            allowed: counter.count < max_per_day,
            current_count: counter.count,
            is_new_day: false,
        })
    }

    /// Record one successful submission.
    ///
    /// On a new day (or first submission ever) the counter is reset to one;
    /// otherwise it is atomically incremented. `lastUpdate` always takes the
    /// server's write time.
    pub async fn record_submission(
        &self,
        user_id: &str,
        is_new_day: bool,
    ) -> Result<(), GuardError> {
        if is_new_day {
            self.store
                .set(
                    self.counter_collection,
                    user_id,
                    [("count".to_string(), json!(1))].into_iter().collect(),
                    vec!["lastUpdate".to_string()],
                )
                .await?;
        } else {
            self.store
                .update_fields(
                    self.counter_collection,
                    user_id,
                    vec![
                        FieldOp::increment("count", 1),
                        FieldOp::server_time("lastUpdate"),
                    ],
                )
                .await?;
        }
        Ok(())
    }
}
