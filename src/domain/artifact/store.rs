//! In-memory artifact collection with dedup and archive semantics.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::chat::ChartSpec;
use crate::domain::foundation::{ArtifactId, DomainError, ErrorCode, Timestamp};

/// A user-pinned visualization extracted from a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    id: ArtifactId,
    chart_type: String,
    chart_title: String,
    chart_data: JsonValue,
    chart_config: JsonValue,
    pinned_at: Timestamp,
    archived: bool,
    stale: bool,
}

impl Artifact {
    fn from_chart(chart: &ChartSpec) -> Self {
        Self {
            id: ArtifactId::new(),
            chart_type: chart.chart_type.clone(),
            chart_title: chart.chart_title.clone(),
            chart_data: chart.chart_data.clone(),
            chart_config: chart.chart_config.clone(),
            pinned_at: Timestamp::now(),
            archived: false,
            stale: false,
        }
    }

    /// Returns the artifact id.
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    /// Returns the chart family.
    pub fn chart_type(&self) -> &str {
        &self.chart_type
    }

    /// Returns the chart title.
    pub fn chart_title(&self) -> &str {
        &self.chart_title
    }

    /// Returns the chart payload.
    pub fn chart_data(&self) -> &JsonValue {
        &self.chart_data
    }

    /// Returns the rendering options.
    pub fn chart_config(&self) -> &JsonValue {
        &self.chart_config
    }

    /// Returns when the artifact was pinned.
    pub fn pinned_at(&self) -> &Timestamp {
        &self.pinned_at
    }

    /// Returns true if the artifact has been archived (soft-deleted).
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Returns true if a refresh has been requested but not yet applied.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn matches(&self, other: &ChartSpec) -> bool {
        self.chart_title == other.chart_title && self.chart_type == other.chart_type
    }
}

/// Deduplicating, archivable store of pinned artifacts.
///
/// Ordering is newest-first by insertion, not by the timestamp field, so
/// the listing stays stable even with coarse clocks.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    artifacts: Vec<Artifact>,
}

impl ArtifactStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins a chart.
    ///
    /// Idempotent by content identity: when an active (non-archived)
    /// artifact with the same `(chart_title, chart_type)` already exists,
    /// its id is returned and nothing is inserted. Otherwise a fresh
    /// artifact is inserted at the head.
    pub fn pin(&mut self, chart: &ChartSpec) -> ArtifactId {
        if let Some(existing) = self
            .artifacts
            .iter()
            .find(|a| !a.archived && a.matches(chart))
        {
            return existing.id;
        }
        let artifact = Artifact::from_chart(chart);
        let id = artifact.id;
        self.artifacts.insert(0, artifact);
        id
    }

    /// Archives an artifact in place (soft delete).
    ///
    /// Idempotent: archiving an already-archived id is a no-op. Ids of
    /// other records are unaffected.
    ///
    /// # Errors
    ///
    /// - `ArtifactNotFound` for an unknown id
    pub fn archive(&mut self, id: ArtifactId) -> Result<(), DomainError> {
        let artifact = self.find_mut(id)?;
        artifact.archived = true;
        Ok(())
    }

    /// Flags an artifact as stale so its chart data can be re-fetched.
    ///
    /// Does not mutate the stored chart fields.
    ///
    /// # Errors
    ///
    /// - `ArtifactNotFound` for an unknown id
    pub fn mark_stale(&mut self, id: ArtifactId) -> Result<(), DomainError> {
        let artifact = self.find_mut(id)?;
        artifact.stale = true;
        Ok(())
    }

    /// Applies re-fetched chart content to an artifact.
    ///
    /// Replace policy: `chart_data` and `chart_config` are overwritten in
    /// place; id, title, type, pin time, and list position are preserved.
    ///
    /// # Errors
    ///
    /// - `ArtifactNotFound` for an unknown id
    pub fn apply_refresh(
        &mut self,
        id: ArtifactId,
        chart_data: JsonValue,
        chart_config: JsonValue,
    ) -> Result<(), DomainError> {
        let artifact = self.find_mut(id)?;
        artifact.chart_data = chart_data;
        artifact.chart_config = chart_config;
        artifact.stale = false;
        Ok(())
    }

    /// Returns the count of active (non-archived) artifacts.
    ///
    /// Updates synchronously with `pin`/`archive`; used for badge counters.
    pub fn active_count(&self) -> usize {
        self.artifacts.iter().filter(|a| !a.archived).count()
    }

    /// Lists active artifacts, newest-first.
    pub fn active(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| !a.archived)
    }

    /// Lists every artifact, archived included, newest-first.
    pub fn all(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Looks up an artifact by id.
    pub fn get(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    fn find_mut(&mut self, id: ArtifactId) -> Result<&mut Artifact, DomainError> {
        self.artifacts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ArtifactNotFound, format!("No artifact {}", id))
            })
    }
}
