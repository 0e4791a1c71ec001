//! # Ingestor Module
//!
//! Validation for knowledge points arriving from the extraction collaborator.
//!
//! - Reject malformed points before they enter a working set
//! - Enforce id uniqueness within a batch and against an existing set
//! - No enrichment: content, tags and confidence are stored as supplied

use crate::primitives::{
    MAX_CONTENT_LENGTH, MAX_ID_LENGTH, MAX_IMPORT_POINTS, MAX_TAG_LENGTH, MAX_TAGS,
};
use crate::types::now_millis;
use crate::{KenningError, KnowledgePoint, PointId};
use std::collections::BTreeSet;

/// The Ingestor validates knowledge points before a working set accepts them.
pub struct Ingestor;

impl Ingestor {
    /// Validate a single point.
    ///
    /// A point is valid if:
    /// - The id is non-empty and within length limits
    /// - The content is within length limits (empty content is allowed)
    /// - Tags and category are within count and length limits
    ///
    /// `confidence` is deliberately not range-checked.
    pub fn validate(point: &KnowledgePoint) -> Result<(), KenningError> {
        let id = point.id.as_str();
        if id.trim().is_empty() {
            return Err(KenningError::InvalidPoint("empty id".to_string()));
        }
        if id.len() > MAX_ID_LENGTH {
            return Err(KenningError::InvalidPoint(format!(
                "id longer than {MAX_ID_LENGTH} bytes"
            )));
        }
        if point.content.len() > MAX_CONTENT_LENGTH {
            return Err(KenningError::InvalidPoint(format!(
                "{id}: content longer than {MAX_CONTENT_LENGTH} bytes"
            )));
        }
        if point.tags.len() > MAX_TAGS {
            return Err(KenningError::InvalidPoint(format!(
                "{id}: more than {MAX_TAGS} tags"
            )));
        }
        if point.tags.iter().any(|t| t.len() > MAX_TAG_LENGTH)
            || point.category.len() > MAX_TAG_LENGTH
        {
            return Err(KenningError::InvalidPoint(format!(
                "{id}: tag or category longer than {MAX_TAG_LENGTH} bytes"
            )));
        }
        Ok(())
    }

    /// Validate a batch against the ids already in a working set.
    ///
    /// Fails on the first invalid point or the first id seen twice.
    pub fn validate_batch<'a>(
        existing: impl IntoIterator<Item = &'a PointId>,
        batch: &[KnowledgePoint],
    ) -> Result<(), KenningError> {
        if batch.len() > MAX_IMPORT_POINTS {
            return Err(KenningError::InvalidArgument(format!(
                "batch of {} points exceeds the limit of {MAX_IMPORT_POINTS}",
                batch.len()
            )));
        }

        let mut seen: BTreeSet<&PointId> = existing.into_iter().collect();
        for point in batch {
            Self::validate(point)?;
            if !seen.insert(&point.id) {
                return Err(KenningError::DuplicatePoint(point.id.clone()));
            }
        }
        Ok(())
    }

    /// Stamp `created_at` on points that arrived without one.
    pub fn stamp(points: &mut [KnowledgePoint]) {
        let now = now_millis();
        for point in points.iter_mut().filter(|p| p.created_at == 0) {
            point.created_at = now;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
