//! Read side of the revision log.

use std::sync::Arc;

use crate::domain::{ChangeType, HistoryField, PostHistory, PostId};
use crate::error::DomainError;
use crate::ports::PostGateway;

/// Fetches the revision log of posts. History is read-only.
#[derive(Clone)]
pub struct HistoryLog {
    gateway: Arc<dyn PostGateway>,
}

impl HistoryLog {
    pub fn new(gateway: Arc<dyn PostGateway>) -> Self {
        Self { gateway }
    }

    /// All revisions of a post, oldest first. Works for deleted posts too.
    pub async fn list(&self, post_id: &PostId) -> Result<HistoryTimeline, DomainError> {
        let entries = self
            .gateway
            .post_history(post_id)
            .await
            .map_err(|e| e.for_entity("post", post_id))?;

        tracing::debug!(post_id = %post_id, entries = entries.len(), "History loaded");
        Ok(HistoryTimeline::from_entries(entries))
    }
}

/// One revision with the fields it changed relative to its predecessor.
#[derive(Debug)]
pub struct Revision<'a> {
    pub entry: &'a PostHistory,
    pub changed: Vec<HistoryField>,
}

/// Revisions of one post in chronological order.
#[derive(Debug, Clone, Default)]
pub struct HistoryTimeline {
    entries: Vec<PostHistory>,
}

impl HistoryTimeline {
    /// Order by `changed_at`; entries with equal stamps keep backend order.
    pub fn from_entries(mut entries: Vec<PostHistory>) -> Self {
        entries.sort_by_key(|entry| entry.changed_at);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PostHistory] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PostHistory> {
        self.entries.iter()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &PostHistory> {
        self.entries.iter().rev()
    }

    pub fn creation(&self) -> Option<&PostHistory> {
        self.entries
            .iter()
            .find(|entry| entry.change_type == ChangeType::Created)
    }

    pub fn latest(&self) -> Option<&PostHistory> {
        self.entries.last()
    }

    /// Each entry paired with what it changed. The first entry reports every
    /// field it carries.
    pub fn revisions(&self) -> Vec<Revision<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let changed = match i.checked_sub(1).map(|prev| &self.entries[prev]) {
                    Some(previous) => entry.changes_since(previous),
                    None => entry.present_fields(),
                };
                Revision { entry, changed }
            })
            .collect()
    }
}

impl IntoIterator for HistoryTimeline {
    type Item = PostHistory;
    type IntoIter = std::vec::IntoIter<PostHistory>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a HistoryTimeline {
    type Item = &'a PostHistory;
    type IntoIter = std::slice::Iter<'a, PostHistory>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
