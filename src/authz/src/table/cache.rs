//! Published-snapshot cache and rebuild coordination
//!
//! Readers take the current snapshot through one lock-free atomic pointer
//! load. Rebuilds are serialized per scope by a small Idle/Building state
//! machine: a trigger that arrives while a build is in flight sets a single
//! pending flag instead of starting a second build, and the in-flight
//! builder runs exactly one follow-up build when it publishes. An arbitrary
//! burst of triggers during one build therefore costs at most one extra
//! build.

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::builder::build_snapshot;
use super::snapshot::TableSnapshot;
use crate::error::Result;
use crate::provider::ResourceProvider;
use crate::types::TableScope;

/// Rebuild coordination state for one scope
#[derive(Debug, Default)]
struct BuildState {
    building: bool,
    pending: bool,
}

/// One scope's publish slot
struct ScopeSlot {
    scope: TableScope,
    published: ArcSwapOption<TableSnapshot>,
    state: Mutex<BuildState>,
    generation: AtomicU64,
}

impl ScopeSlot {
    fn new(scope: TableScope) -> Self {
        Self {
            scope,
            published: ArcSwapOption::new(None),
            state: Mutex::new(BuildState::default()),
            generation: AtomicU64::new(0),
        }
    }
}

/// Counters over coordinator activity
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStats {
    /// Builds actually executed
    pub builds_started: usize,
    /// Builds aborted on a provider error
    pub builds_failed: usize,
    /// Triggers folded into an in-flight build
    pub coalesced: usize,
}

/// Holds every published permission table behind atomically swappable
/// references and serializes rebuilds per scope.
pub struct TableCache {
    provider: Arc<dyn ResourceProvider>,
    global: Arc<ScopeSlot>,
    tenants: DashMap<String, Arc<ScopeSlot>>,
    scope_sets: DashMap<String, Arc<ScopeSlot>>,
    stats: DashMap<String, usize>,
}

impl TableCache {
    pub fn new(provider: Arc<dyn ResourceProvider>) -> Self {
        Self {
            provider,
            global: Arc::new(ScopeSlot::new(TableScope::Global)),
            tenants: DashMap::new(),
            scope_sets: DashMap::new(),
            stats: DashMap::new(),
        }
    }

    fn slot(&self, scope: &TableScope) -> Arc<ScopeSlot> {
        match scope {
            TableScope::Global => Arc::clone(&self.global),
            TableScope::Tenant(id) => self
                .tenants
                .entry(id.clone())
                .or_insert_with(|| Arc::new(ScopeSlot::new(scope.clone())))
                .clone(),
            TableScope::ScopeSet(names) => {
                let key = names.iter().cloned().collect::<Vec<_>>().join(",");
                self.scope_sets
                    .entry(key)
                    .or_insert_with(|| Arc::new(ScopeSlot::new(scope.clone())))
                    .clone()
            }
        }
    }

    /// Lock-free read of the currently published snapshot for a scope
    pub fn snapshot(&self, scope: &TableScope) -> Option<Arc<TableSnapshot>> {
        self.slot(scope).published.load_full()
    }

    /// Published snapshot, building it first if this scope was never built.
    ///
    /// The lazy first build is the only evaluation-path provider fetch;
    /// once a scope is published, reads here never touch I/O. A failed
    /// first build resolves to `None` and the evaluator denies.
    pub async fn ensure(&self, scope: &TableScope) -> Option<Arc<TableSnapshot>> {
        let slot = self.slot(scope);
        if let Some(snapshot) = slot.published.load_full() {
            return Some(snapshot);
        }

        if let Err(err) = self.rebuild(scope).await {
            warn!(scope = %scope, error = %err, "initial table build failed");
        }
        slot.published.load_full()
    }

    /// Run, or coalesce into, a rebuild of one scope's table.
    ///
    /// On failure the previous snapshot stays published and the pending
    /// flag survives, so the next trigger or explicit retry picks the
    /// rebuild up again.
    pub async fn rebuild(&self, scope: &TableScope) -> Result<()> {
        let slot = self.slot(scope);

        {
            let mut state = slot.state.lock().await;
            if state.building {
                state.pending = true;
                self.increment_stat("coalesced");
                return Ok(());
            }
            // This build satisfies any previously queued request.
            state.building = true;
            state.pending = false;
        }

        loop {
            self.increment_stat("builds_started");
            let generation = slot.generation.load(Ordering::Relaxed) + 1;

            match build_snapshot(self.provider.as_ref(), scope, generation).await {
                Ok(snapshot) => {
                    slot.generation.store(generation, Ordering::Relaxed);
                    slot.published.store(Some(Arc::new(snapshot)));
                    info!(scope = %slot.scope, generation, "published permission table snapshot");

                    let mut state = slot.state.lock().await;
                    if state.pending {
                        state.pending = false;
                        continue;
                    }
                    state.building = false;
                    return Ok(());
                }
                Err(err) => {
                    self.increment_stat("builds_failed");
                    let mut state = slot.state.lock().await;
                    state.building = false;
                    // pending stays untouched so a retry happens on the
                    // next trigger.
                    return Err(err);
                }
            }
        }
    }

    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            builds_started: self.get_stat("builds_started"),
            builds_failed: self.get_stat("builds_failed"),
            coalesced: self.get_stat("coalesced"),
        }
    }

    fn increment_stat(&self, key: &str) {
        self.stats
            .entry(key.to_string())
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}
