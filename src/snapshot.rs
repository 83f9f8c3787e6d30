use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::record::Record;

/// Records from one load. Never modified after creation.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<Record>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>, fetched_at: DateTime<Utc>) -> Self {
        Snapshot { records, fetched_at }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// Result of the latest load. A failure replaces the previous snapshot.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(Arc<Snapshot>),
    Failed(String),
}

pub enum Expire {
    Never,
    After(Duration),
}

struct StoredOutcome {
    expire_date: DateTime<Utc>,
    outcome: LoadOutcome,
}

/// Holds the latest load outcome, shared by every worker.
pub struct SnapshotStore {
    latest: RwLock<Option<StoredOutcome>>,
    expire_after: Expire,
}

impl SnapshotStore {
    pub fn new(expire_after: Expire) -> Self {
        SnapshotStore {
            latest: RwLock::new(None),
            expire_after,
        }
    }

    /// The latest outcome, unless nothing was loaded yet or it expired.
    pub fn get(&self) -> Option<LoadOutcome> {
        let latest = self.latest.read().unwrap_or_else(|e| e.into_inner());
        let stored = latest.as_ref()?;
        if Utc::now() > stored.expire_date {
            return None;
        }
        Some(stored.outcome.clone())
    }

    pub fn store(&self, outcome: LoadOutcome) -> LoadOutcome {
        let expire_date = match self.expire_after {
            Expire::Never => DateTime::<Utc>::MAX_UTC,
            Expire::After(duration) => Utc::now() + duration,
        };

        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = Some(StoredOutcome {
            expire_date,
            outcome: outcome.clone(),
        });
        outcome
    }
}
