use std::collections::VecDeque;

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::models::{ReportId, ReportRecord};
use crate::validation::ValidatedReport;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("position {position} out of range (size {size})")]
    OutOfRange { position: usize, size: usize },
    #[error("report {0} not found")]
    NotFound(ReportId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, newest-first collection of reports belonging to one session.
///
/// Position 0 is always the most recent insert. Positions shift on every
/// mutation, so a position is only meaningful against the listing it came
/// from; [`ReportStore::delete_by_id`] is the stable alternative.
#[derive(Debug, Default, Clone)]
pub struct ReportStore {
    records: VecDeque<ReportRecord>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the report and places it at position 0. Never fails.
    pub fn insert(&mut self, report: ValidatedReport) -> ReportRecord {
        self.insert_stamped(report, Utc::now())
    }

    fn insert_stamped(&mut self, report: ValidatedReport, now: DateTime<Utc>) -> ReportRecord {
        let record = ReportRecord {
            id: Uuid::new_v4(),
            kind: report.kind,
            item_name: report.item_name,
            location: report.location,
            description: report.description,
            created_at: now.trunc_subsecs(0),
        };
        self.records.push_front(record.clone());
        record
    }

    /// Snapshot of the current records, newest first.
    pub fn list(&self) -> Vec<ReportRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn get(&self, position: usize) -> Option<&ReportRecord> {
        self.records.get(position)
    }

    /// Removes the record at `position`; later records shift down by one.
    /// The store is left untouched on error.
    pub fn delete_at(&mut self, position: usize) -> StoreResult<ReportRecord> {
        let size = self.records.len();
        self.records
            .remove(position)
            .ok_or(StoreError::OutOfRange { position, size })
    }

    pub fn delete_by_id(&mut self, id: ReportId) -> StoreResult<ReportRecord> {
        let position = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.delete_at(position)
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
