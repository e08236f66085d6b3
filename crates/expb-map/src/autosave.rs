//! Debounced change notification for persisting the mapping store.
//!
//! Mutations record the latest change per binding and restart the timer.
//! Once the timer lapses, a single coalesced flush is produced. Intermediate
//! states are never queued: the last write to a binding wins.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use expb_model::ComponentId;

use crate::snapshot::MappingSnapshot;

/// Delay between the last mutation and the persisted write.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// Source of the current time for debouncing.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    elapsed_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

/// What happened to a binding or component since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The binding (or component) now exists with a new value.
    Set,
    /// The binding (or component) was removed.
    Removed,
}

/// One coalesced change. `key` is `None` for component placement and removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub component: ComponentId,
    pub key: Option<String>,
    pub kind: ChangeKind,
}

/// Changes accumulated since the previous flush, ordered by component and key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flush {
    pub changes: Vec<Change>,
}

impl Flush {
    pub fn removed_keys(&self) -> impl Iterator<Item = (&ComponentId, &str)> {
        self.changes.iter().filter_map(|change| match (&change.key, change.kind) {
            (Some(key), ChangeKind::Removed) => Some((&change.component, key.as_str())),
            _ => None,
        })
    }
}

/// Receives flushed changes together with the state they lead to.
pub trait PersistSink {
    fn persist(&mut self, flush: &Flush, snapshot: &MappingSnapshot) -> anyhow::Result<()>;
}

/// Debounce timer plus the changes pending behind it.
#[derive(Debug, Clone)]
pub struct Autosave {
    delay: Duration,
    deadline: Option<Instant>,
    pending: BTreeMap<(ComponentId, Option<String>), ChangeKind>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            pending: BTreeMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records a change and restarts the timer at `now + delay`.
    pub fn record(
        &mut self,
        component: &ComponentId,
        key: Option<&str>,
        kind: ChangeKind,
        now: Instant,
    ) {
        self.pending
            .insert((component.clone(), key.map(str::to_string)), kind);
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Takes the pending changes once the timer has lapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Flush> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Takes the pending changes regardless of the timer.
    pub fn take(&mut self) -> Option<Flush> {
        self.deadline = None;
        if self.pending.is_empty() {
            return None;
        }
        let changes = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|((component, key), kind)| Change {
                component,
                key,
                kind,
            })
            .collect();
        Some(Flush { changes })
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ComponentId {
        ComponentId::new(value).unwrap()
    }

    #[test]
    fn rapid_edits_coalesce_into_one_flush() {
        let clock = ManualClock::new();
        let mut autosave = Autosave::new(Duration::from_millis(100));
        let c = id("img");

        autosave.record(&c, Some("prompt"), ChangeKind::Set, clock.now());
        clock.advance(Duration::from_millis(60));
        autosave.record(&c, Some("prompt"), ChangeKind::Removed, clock.now());
        clock.advance(Duration::from_millis(60));
        // Timer restarted by the second edit.
        assert!(autosave.poll(clock.now()).is_none());

        clock.advance(Duration::from_millis(40));
        let flush = autosave.poll(clock.now()).expect("flush due");
        assert_eq!(
            flush.changes,
            vec![Change {
                component: c.clone(),
                key: Some("prompt".into()),
                kind: ChangeKind::Removed,
            }]
        );
        assert_eq!(flush.removed_keys().count(), 1);
        assert!(autosave.poll(clock.now()).is_none());
    }

    #[test]
    fn take_without_changes_yields_nothing() {
        let mut autosave = Autosave::default();
        assert!(autosave.take().is_none());
        assert!(!autosave.is_pending());
    }
}
