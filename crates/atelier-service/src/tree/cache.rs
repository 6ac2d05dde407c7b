//! Session-scoped cache of loaded subtrees.
//!
//! One instance per client session, created with the session and passed
//! explicitly to whatever renders the tree — never a module-level
//! singleton. Each parent key (`None` = the root level) tracks its own
//! loading lifecycle, so a large tree can be expanded partially without
//! ever loading all of it, and a mutation invalidates only the parents
//! it touched.
//!
//! The legal transitions are:
//! `Unloaded → Loading` (first expand), `Loading → Loaded | Error`
//! (response), `Loaded → Loading` (explicit refresh only — re-expanding
//! an already loaded folder does not re-fetch), any state → `Unloaded`
//! (invalidation after a mutation).

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use uuid::Uuid;

use atelier_entity::node::Node;

/// Lifecycle state of one parent's child listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubtreeState {
    /// Never requested.
    #[default]
    Unloaded,
    /// Request in flight.
    Loading,
    /// Children are present.
    Loaded(Vec<Node>),
    /// The last request failed.
    Error(String),
}

/// Per-session cache of loaded subtrees plus the global mutation gate.
#[derive(Debug, Default)]
pub struct TreeCache {
    entries: DashMap<Option<Uuid>, SubtreeState>,
    action_in_flight: AtomicBool,
}

/// RAII guard for the global mutation gate: held while one structural
/// mutation is in flight, released on drop.
#[derive(Debug)]
pub struct ActionGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl TreeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a parent key.
    pub fn state(&self, parent_id: Option<Uuid>) -> SubtreeState {
        self.entries
            .get(&parent_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Marks a first load. Returns `true` when a fetch should be issued:
    /// only from `Unloaded` or `Error`. Expanding an already loaded
    /// folder is a no-op, and a load already in flight is not repeated.
    pub fn begin_load(&self, parent_id: Option<Uuid>) -> bool {
        let mut entry = self.entries.entry(parent_id).or_default();
        match *entry {
            SubtreeState::Unloaded | SubtreeState::Error(_) => {
                *entry = SubtreeState::Loading;
                true
            }
            SubtreeState::Loading | SubtreeState::Loaded(_) => false,
        }
    }

    /// Marks an explicit refresh. Returns `true` when a fetch should be
    /// issued: only from `Loaded`.
    pub fn begin_refresh(&self, parent_id: Option<Uuid>) -> bool {
        let mut entry = self.entries.entry(parent_id).or_default();
        match *entry {
            SubtreeState::Loaded(_) => {
                *entry = SubtreeState::Loading;
                true
            }
            _ => false,
        }
    }

    /// Records a successful response. Ignored unless a load is in
    /// flight, so a response superseded by an invalidation is dropped.
    pub fn complete_load(&self, parent_id: Option<Uuid>, children: Vec<Node>) {
        let mut entry = self.entries.entry(parent_id).or_default();
        if *entry == SubtreeState::Loading {
            *entry = SubtreeState::Loaded(children);
        }
    }

    /// Records a failed response. Ignored unless a load is in flight.
    pub fn fail_load(&self, parent_id: Option<Uuid>, detail: impl Into<String>) {
        let mut entry = self.entries.entry(parent_id).or_default();
        if *entry == SubtreeState::Loading {
            *entry = SubtreeState::Error(detail.into());
        }
    }

    /// Drops a parent's cached listing after a mutation touched it. The
    /// next expansion fetches from scratch.
    pub fn invalidate(&self, parent_id: Option<Uuid>) {
        self.entries.remove(&parent_id);
    }

    /// Acquires the global mutation gate. Returns `None` while another
    /// structural mutation is in flight. This serializes mutations from
    /// one session's perspective only; the store's transactional checks
    /// remain the real safety net.
    pub fn begin_action(&self) -> Option<ActionGuard<'_>> {
        self.action_in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ActionGuard {
                flag: &self.action_in_flight,
            })
    }

    /// Whether a structural mutation is currently in flight.
    pub fn is_performing_action(&self) -> bool {
        self.action_in_flight.load(Ordering::Acquire)
    }
}
