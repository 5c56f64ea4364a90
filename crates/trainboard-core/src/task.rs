//! Tracking for in-flight asynchronous work and the notices shown to the
//! user when something recoverable goes wrong.
//!
//! Every async operation (training request, document write) is started
//! with [`TaskLedger::begin`] and reported back with
//! [`TaskLedger::finish`]. Overlapping tasks of the same kind are allowed;
//! nothing is cancelled or de-duplicated.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainboardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Training,
    DocumentWrite,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Training => write!(f, "training request"),
            TaskKind::DocumentWrite => write!(f, "submission write"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed(String),
    /// Still pending when the context was torn down.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Finished or abandoned entries kept for lookup; older ones are pruned.
pub const RETAINED_FINISHED: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct TaskLedger {
    next_id: u64,
    tasks: BTreeMap<TaskId, TaskEntry>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, kind: TaskKind) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.insert(
            id,
            TaskEntry {
                kind,
                status: TaskStatus::Pending,
                started_at: Utc::now(),
                finished_at: None,
            },
        );
        id
    }

    /// Record the outcome of a pending task. Finishing an unknown or
    /// already finished task is an error.
    pub fn finish(&mut self, id: TaskId, outcome: std::result::Result<(), String>) -> Result<TaskKind> {
        let entry = self
            .tasks
            .get_mut(&id)
            .filter(|e| e.status == TaskStatus::Pending)
            .ok_or(TrainboardError::TaskNotFound(id.0))?;
        entry.status = match outcome {
            Ok(()) => TaskStatus::Succeeded,
            Err(msg) => TaskStatus::Failed(msg),
        };
        entry.finished_at = Some(Utc::now());
        let kind = entry.kind;
        self.prune();
        Ok(kind)
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskEntry> {
        self.tasks.get(&id)
    }

    pub fn status(&self, id: TaskId) -> Option<&TaskStatus> {
        self.tasks.get(&id).map(|e| &e.status)
    }

    pub fn pending(&self) -> impl Iterator<Item = (TaskId, &TaskEntry)> {
        self.tasks
            .iter()
            .filter(|(_, e)| e.status == TaskStatus::Pending)
            .map(|(id, e)| (*id, e))
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Mark every pending task abandoned; returns how many there were.
    pub fn abandon_pending(&mut self) -> usize {
        let now = Utc::now();
        let mut n = 0;
        for entry in self.tasks.values_mut() {
            if entry.status == TaskStatus::Pending {
                entry.status = TaskStatus::Abandoned;
                entry.finished_at = Some(now);
                n += 1;
            }
        }
        self.prune();
        n
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop the oldest terminal entries beyond [`RETAINED_FINISHED`].
    /// Pending tasks are never pruned.
    fn prune(&mut self) {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, e)| e.status != TaskStatus::Pending)
            .map(|(id, _)| *id)
            .collect();
        let excess = finished.len().saturating_sub(RETAINED_FINISHED);
        for id in &finished[..excess] {
            self.tasks.remove(id);
        }
    }
}

// ─── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notices {
    next_id: u64,
    items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.items.push(Notice {
            id: self.next_id,
            level,
            message: message.into(),
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_lifecycle() {
        let mut ledger = TaskLedger::new();
        let a = ledger.begin(TaskKind::Training);
        let b = ledger.begin(TaskKind::Training);
        assert_ne!(a, b);
        assert_eq!(ledger.pending_count(), 2);

        assert_eq!(ledger.finish(a, Ok(())).unwrap(), TaskKind::Training);
        ledger.finish(b, Err("connection refused".into())).unwrap();

        assert_eq!(ledger.status(a), Some(&TaskStatus::Succeeded));
        assert_eq!(
            ledger.status(b),
            Some(&TaskStatus::Failed("connection refused".into()))
        );
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_finish_twice_is_rejected() {
        let mut ledger = TaskLedger::new();
        let id = ledger.begin(TaskKind::DocumentWrite);
        ledger.finish(id, Ok(())).unwrap();
        assert!(matches!(
            ledger.finish(id, Ok(())),
            Err(TrainboardError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_finished_entries_are_pruned() {
        let mut ledger = TaskLedger::new();
        let open = ledger.begin(TaskKind::DocumentWrite);
        let first = ledger.begin(TaskKind::Training);
        ledger.finish(first, Ok(())).unwrap();

        let mut last = first;
        for _ in 0..RETAINED_FINISHED {
            last = ledger.begin(TaskKind::Training);
            ledger.finish(last, Ok(())).unwrap();
        }

        assert_eq!(ledger.len(), RETAINED_FINISHED + 1);
        assert_eq!(ledger.status(first), None);
        assert_eq!(ledger.status(last), Some(&TaskStatus::Succeeded));
        assert_eq!(ledger.status(open), Some(&TaskStatus::Pending));
    }

    #[test]
    fn test_abandon_pending() {
        let mut ledger = TaskLedger::new();
        let done = ledger.begin(TaskKind::Training);
        ledger.finish(done, Ok(())).unwrap();
        let open = ledger.begin(TaskKind::DocumentWrite);

        assert_eq!(ledger.abandon_pending(), 1);
        assert_eq!(ledger.status(open), Some(&TaskStatus::Abandoned));
        assert_eq!(ledger.status(done), Some(&TaskStatus::Succeeded));
    }

    #[test]
    fn test_notices_dismiss() {
        let mut notices = Notices::default();
        let first = notices.push(NoticeLevel::Warning, "storage full");
        notices.push(NoticeLevel::Error, "backend down");
        notices.dismiss(first);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices.iter().next().unwrap().message, "backend down");
    }
}
