//! The permission evaluator
//!
//! Orchestrates claim classification, group expansion, snapshot selection,
//! and pattern matching into the two public decision operations.
//!
//! ```text
//! claims -> classifier -> expander -> snapshot lookup -> matcher -> bool
//!                                        |
//!                                  [TableCache] <- rebuild triggers
//! ```

pub mod trigger;
pub mod verbs;

pub use trigger::UpdateTrigger;
pub use verbs::VerbMap;

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::claims::PrincipalContext;
use crate::error::Result;
use crate::groups::expand_groups;
use crate::provider::ResourceProvider;
use crate::table::{CoordinatorStats, TableCache, TableSnapshot};
use crate::types::TableScope;

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Method -> verb derivation table
    pub verbs: VerbMap,
}

/// Access-control decision engine.
///
/// Evaluation is read-only against the currently published snapshot:
/// concurrent `allowed`/`has_verb` callers never block each other and never
/// block a rebuild. Rebuilds construct the next table off to the side and
/// publish it with one atomic pointer swap.
pub struct AccessEngine {
    tables: Arc<TableCache>,
    verbs: VerbMap,
    trigger: UpdateTrigger,
}

impl AccessEngine {
    /// Create the engine and run the initial global table build.
    ///
    /// A provider failure here is returned to the caller; the engine never
    /// starts without a published global snapshot.
    pub async fn new(provider: Arc<dyn ResourceProvider>) -> Result<Self> {
        Self::with_config(provider, EngineConfig::default()).await
    }

    pub async fn with_config(
        provider: Arc<dyn ResourceProvider>,
        config: EngineConfig,
    ) -> Result<Self> {
        let tables = Arc::new(TableCache::new(provider));
        tables.rebuild(&TableScope::Global).await?;

        let (trigger, mut rx) = UpdateTrigger::channel();
        let listener_tables = Arc::clone(&tables);
        tokio::spawn(async move {
            while let Some(scope) = rx.recv().await {
                if let Err(err) = listener_tables.rebuild(&scope).await {
                    warn!(
                        scope = %scope,
                        error = %err,
                        "triggered rebuild failed; previous snapshot stays live"
                    );
                }
            }
        });

        info!("access engine initialized");
        Ok(Self {
            tables,
            verbs: config.verbs,
            trigger,
        })
    }

    /// May `principal` invoke `method` on `path`?
    ///
    /// The verb is derived from the HTTP-style method; absence of any
    /// matching grant is a deny, never an error.
    pub async fn allowed(&self, principal: &PrincipalContext, path: &str, method: &str) -> bool {
        let Some(verb) = self.verbs.derive(method) else {
            debug!(method, "no verb derivation for method; denying");
            return false;
        };
        self.decide(principal, path, verb).await
    }

    /// Does `principal` hold `verb` on `resource`?
    ///
    /// Same resolution as [`allowed`](Self::allowed) with a literal verb,
    /// for guards naming an explicit verb string.
    pub async fn has_verb(&self, principal: &PrincipalContext, resource: &str, verb: &str) -> bool {
        self.decide(principal, resource, verb).await
    }

    async fn decide(&self, principal: &PrincipalContext, path: &str, verb: &str) -> bool {
        if principal.tenant_ambiguous() {
            warn!("principal claims more than one tenant; denying");
            return false;
        }
        if principal.is_empty() {
            debug!(path, verb, "principal carries no authorities; denying");
            return false;
        }

        // Tenant-scoped resolution is exclusive: once a tenant token is
        // present the global table is not consulted.
        let role_scope = match principal.tenant() {
            Some(tenant) => TableScope::Tenant(tenant.clone()),
            None => TableScope::Global,
        };

        if let Some(snapshot) = self.tables.ensure(&role_scope).await {
            if self.roles_grant(principal, &snapshot, path, verb) {
                debug!(path, verb, scope = %role_scope, "grant matched");
                return true;
            }
        }

        if !principal.scopes().is_empty() {
            let names: BTreeSet<String> = principal.scopes().iter().cloned().collect();
            let scope_scope = TableScope::ScopeSet(names);
            if let Some(snapshot) = self.tables.ensure(&scope_scope).await {
                if snapshot.table().grants(path, verb, principal.scopes()) {
                    debug!(path, verb, "scope-derived grant matched");
                    return true;
                }
            }
        }

        debug!(path, verb, "no grant matched; denying");
        false
    }

    fn roles_grant(
        &self,
        principal: &PrincipalContext,
        snapshot: &TableSnapshot,
        path: &str,
        verb: &str,
    ) -> bool {
        let mut authorities: HashSet<String> = principal.roles().clone();
        authorities.extend(expand_groups(principal.groups(), snapshot.group_roles()));
        snapshot.table().grants(path, verb, &authorities)
    }

    /// Administrative out-of-band refresh of one scope's table.
    ///
    /// Returns the build error on failure; the previously published
    /// snapshot stays live either way.
    pub async fn force_rebuild(&self, scope: &TableScope) -> Result<()> {
        self.tables.rebuild(scope).await
    }

    /// Handle for grant-change notifications. Cloneable; coalescing
    /// applies per scope.
    pub fn update_trigger(&self) -> UpdateTrigger {
        self.trigger.clone()
    }

    /// Currently published snapshot for a scope, if any (lock-free read)
    pub fn snapshot(&self, scope: &TableScope) -> Option<Arc<TableSnapshot>> {
        self.tables.snapshot(scope)
    }

    /// Coordinator build/coalesce counters
    pub fn stats(&self) -> CoordinatorStats {
        self.tables.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryResourceProvider;
    use crate::types::PermissionEntry;

    async fn engine_with(provider: InMemoryResourceProvider) -> AccessEngine {
        AccessEngine::new(Arc::new(provider)).await.unwrap()
    }

    #[tokio::test]
    async fn test_unknown_method_denies() {
        let provider = InMemoryResourceProvider::new();
        provider
            .grant_global("ADMIN", vec![PermissionEntry::new("/**", ["read"])])
            .await;
        let engine = engine_with(provider).await;

        let principal = PrincipalContext::from_tokens(["ROLE_ADMIN"]);
        assert!(engine.allowed(&principal, "/admin", "GET").await);
        assert!(!engine.allowed(&principal, "/admin", "PROPFIND").await);
    }

    #[tokio::test]
    async fn test_custom_verb_mapping() {
        let provider = InMemoryResourceProvider::new();
        provider
            .grant_global("ADMIN", vec![PermissionEntry::new("/jobs/*", ["submit"])])
            .await;

        let config = EngineConfig {
            verbs: VerbMap::default().with_mapping("POST", "submit"),
        };
        let engine = AccessEngine::with_config(Arc::new(provider), config)
            .await
            .unwrap();

        let principal = PrincipalContext::from_tokens(["ROLE_ADMIN"]);
        assert!(engine.allowed(&principal, "/jobs/nightly", "POST").await);
    }

    #[tokio::test]
    async fn test_ambiguous_tenant_denies_everything() {
        let provider = InMemoryResourceProvider::new();
        provider
            .grant_global("ADMIN", vec![PermissionEntry::new("/**", ["read"])])
            .await;
        let engine = engine_with(provider).await;

        let principal = PrincipalContext::from_tokens(["ROLE_ADMIN", "TENANT_1", "TENANT_2"]);
        assert!(!engine.allowed(&principal, "/admin", "GET").await);
    }

    #[tokio::test]
    async fn test_has_verb_checks_literal_membership() {
        let provider = InMemoryResourceProvider::new();
        provider
            .grant_global("AUDITOR", vec![PermissionEntry::new("/ledger/**", ["export"])])
            .await;
        let engine = engine_with(provider).await;

        let principal = PrincipalContext::from_tokens(["ROLE_AUDITOR"]);
        assert!(engine.has_verb(&principal, "/ledger/2023", "export").await);
        assert!(!engine.has_verb(&principal, "/ledger/2023", "delete").await);
    }
}
