use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ReportId, ReportRecord, SessionId};
use crate::store::{ReportStore, StoreError};
use crate::validation::ValidatedReport;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RepoError {
    #[error("session not found")] SessionNotFound,
    #[error("session limit reached")] SessionLimit,
    #[error("position {position} out of range (size {size})")] OutOfRange { position: i64, size: usize },
    #[error("report {0} not found")] ReportNotFound(ReportId),
}

impl From<StoreError> for RepoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OutOfRange { position, size } => RepoError::OutOfRange {
                position: i64::try_from(position).unwrap_or(i64::MAX),
                size,
            },
            StoreError::NotFound(id) => RepoError::ReportNotFound(id),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn open_session(&self) -> RepoResult<SessionId>;
    /// Ends the session and discards its whole report collection.
    async fn close_session(&self, id: SessionId) -> RepoResult<()>;
    async fn session_count(&self) -> usize;
    /// Drops sessions untouched for at least `ttl`; returns their ids.
    async fn evict_idle(&self, ttl: Duration) -> Vec<SessionId>;
}

#[async_trait]
pub trait ReportRepo: Send + Sync {
    async fn insert_report(&self, session: SessionId, report: ValidatedReport) -> RepoResult<ReportRecord>;
    async fn list_reports(&self, session: SessionId) -> RepoResult<Vec<ReportRecord>>;
    /// Position-based delete. `position` is signed because it arrives from
    /// clients; negative values are reported as out of range.
    async fn delete_report_at(&self, session: SessionId, position: i64) -> RepoResult<ReportRecord>;
    async fn delete_report_by_id(&self, session: SessionId, id: ReportId) -> RepoResult<ReportRecord>;
    async fn report_count(&self, session: SessionId) -> RepoResult<usize>;
}

pub trait Repo: SessionRepo + ReportRepo {}

impl<T> Repo for T where T: SessionRepo + ReportRepo {}

pub mod inmem {
    use super::*;

    pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

    struct SessionSlot {
        store: ReportStore,
        last_seen: Instant,
    }

    /// Process-local sessions, each owning an isolated [`ReportStore`].
    /// A store is only touched while its map entry is held exclusively, so
    /// requests on one session serialise and never see another session.
    #[derive(Clone)]
    pub struct InMemRepo {
        sessions: Arc<DashMap<SessionId, SessionSlot>>,
        max_sessions: usize,
    }

    impl InMemRepo {
        pub fn new() -> Self {
            Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
        }

        pub fn with_max_sessions(max_sessions: usize) -> Self {
            Self { sessions: Arc::new(DashMap::new()), max_sessions }
        }

        fn with_store<T>(
            &self,
            id: SessionId,
            f: impl FnOnce(&mut ReportStore) -> RepoResult<T>,
        ) -> RepoResult<T> {
            let mut slot = self.sessions.get_mut(&id).ok_or(RepoError::SessionNotFound)?;
            slot.last_seen = Instant::now();
            f(&mut slot.store)
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self { Self::new() }
    }

    #[async_trait]
    impl SessionRepo for InMemRepo {
        async fn open_session(&self) -> RepoResult<SessionId> {
            // soft cap: concurrent opens may overshoot by a few
            if self.sessions.len() >= self.max_sessions {
                return Err(RepoError::SessionLimit);
            }
            let id = Uuid::new_v4();
            self.sessions.insert(id, SessionSlot { store: ReportStore::new(), last_seen: Instant::now() });
            debug!(session = %id, "session opened");
            Ok(id)
        }

        async fn close_session(&self, id: SessionId) -> RepoResult<()> {
            let (_, slot) = self.sessions.remove(&id).ok_or(RepoError::SessionNotFound)?;
            debug!(session = %id, discarded = slot.store.size(), "session closed");
            Ok(())
        }

        async fn session_count(&self) -> usize {
            self.sessions.len()
        }

        async fn evict_idle(&self, ttl: Duration) -> Vec<SessionId> {
            let now = Instant::now();
            let mut evicted = Vec::new();
            self.sessions.retain(|id, slot| {
                let keep = now.duration_since(slot.last_seen) < ttl;
                if !keep { evicted.push(*id); }
                keep
            });
            evicted
        }
    }

    #[async_trait]
    impl ReportRepo for InMemRepo {
        async fn insert_report(&self, session: SessionId, report: ValidatedReport) -> RepoResult<ReportRecord> {
            self.with_store(session, |store| Ok(store.insert(report)))
        }

        async fn list_reports(&self, session: SessionId) -> RepoResult<Vec<ReportRecord>> {
            self.with_store(session, |store| Ok(store.list()))
        }

        async fn delete_report_at(&self, session: SessionId, position: i64) -> RepoResult<ReportRecord> {
            self.with_store(session, |store| {
                let idx = usize::try_from(position)
                    .map_err(|_| RepoError::OutOfRange { position, size: store.size() })?;
                Ok(store.delete_at(idx)?)
            })
        }

        async fn delete_report_by_id(&self, session: SessionId, id: ReportId) -> RepoResult<ReportRecord> {
            self.with_store(session, |store| Ok(store.delete_by_id(id)?))
        }

        async fn report_count(&self, session: SessionId) -> RepoResult<usize> {
            self.with_store(session, |store| Ok(store.size()))
        }
    }
}
