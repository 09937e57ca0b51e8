//! Resource provider interface and the in-memory reference implementation
//!
//! The engine never talks to storage directly: all role/tenant/scope/group
//! grant data comes through [`ResourceProvider`]. Database- or RPC-backed
//! implementations live with the embedder; the in-memory provider here
//! backs the test suite and embedders without external storage.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{GroupRoleMap, PermissionEntry, RoleResourceMap, TenantId};

/// External source of role/tenant/scope/group grant data
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Role grants that apply outside any tenant
    async fn global_role_resources(&self) -> Result<RoleResourceMap>;

    /// Role grants scoped to one tenant
    async fn tenant_role_resources(&self, tenant: &str) -> Result<RoleResourceMap>;

    /// Grants keyed by scope name, for the requested scope-name set
    async fn scope_role_resources(&self, scopes: &BTreeSet<String>) -> Result<RoleResourceMap>;

    /// Global group -> role expansion map
    async fn global_group_roles(&self) -> Result<GroupRoleMap>;

    /// Tenant-scoped group -> role expansion map
    async fn tenant_group_roles(&self, tenant: &str) -> Result<GroupRoleMap>;
}

#[derive(Default)]
struct ProviderState {
    global_roles: RoleResourceMap,
    tenant_roles: HashMap<TenantId, RoleResourceMap>,
    scope_grants: HashMap<String, Vec<PermissionEntry>>,
    global_groups: GroupRoleMap,
    tenant_groups: HashMap<TenantId, GroupRoleMap>,
}

/// In-memory resource provider
#[derive(Clone, Default)]
pub struct InMemoryResourceProvider {
    state: Arc<RwLock<ProviderState>>,
}

impl InMemoryResourceProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant entries to a role in the global table
    pub async fn grant_global(&self, role: impl Into<String>, entries: Vec<PermissionEntry>) {
        let mut state = self.state.write().await;
        state.global_roles.entry(role.into()).or_default().extend(entries);
    }

    /// Replace the entire global role map
    pub async fn set_global_roles(&self, map: RoleResourceMap) {
        self.state.write().await.global_roles = map;
    }

    /// Grant entries to a role inside one tenant
    pub async fn grant_tenant(
        &self,
        tenant: impl Into<String>,
        role: impl Into<String>,
        entries: Vec<PermissionEntry>,
    ) {
        let mut state = self.state.write().await;
        state
            .tenant_roles
            .entry(tenant.into())
            .or_default()
            .entry(role.into())
            .or_default()
            .extend(entries);
    }

    /// Grant entries to a scope name
    pub async fn grant_scope(&self, scope: impl Into<String>, entries: Vec<PermissionEntry>) {
        let mut state = self.state.write().await;
        state.scope_grants.entry(scope.into()).or_default().extend(entries);
    }

    /// Map a group to the roles it expands to in the global group map
    pub async fn map_group(
        &self,
        group: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) {
        let mut state = self.state.write().await;
        state
            .global_groups
            .entry(group.into())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
    }

    /// Map a group to roles inside one tenant
    pub async fn map_tenant_group(
        &self,
        tenant: impl Into<String>,
        group: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) {
        let mut state = self.state.write().await;
        state
            .tenant_groups
            .entry(tenant.into())
            .or_default()
            .entry(group.into())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
    }

    /// Remove every global grant for a role
    pub async fn revoke_global(&self, role: &str) {
        self.state.write().await.global_roles.remove(role);
    }
}

#[async_trait]
impl ResourceProvider for InMemoryResourceProvider {
    async fn global_role_resources(&self) -> Result<RoleResourceMap> {
        Ok(self.state.read().await.global_roles.clone())
    }

    async fn tenant_role_resources(&self, tenant: &str) -> Result<RoleResourceMap> {
        let state = self.state.read().await;
        Ok(state.tenant_roles.get(tenant).cloned().unwrap_or_default())
    }

    async fn scope_role_resources(&self, scopes: &BTreeSet<String>) -> Result<RoleResourceMap> {
        let state = self.state.read().await;
        let mut map = RoleResourceMap::new();
        for name in scopes {
            if let Some(entries) = state.scope_grants.get(name) {
                map.insert(name.clone(), entries.clone());
            }
        }
        Ok(map)
    }

    async fn global_group_roles(&self) -> Result<GroupRoleMap> {
        Ok(self.state.read().await.global_groups.clone())
    }

    async fn tenant_group_roles(&self, tenant: &str) -> Result<GroupRoleMap> {
        let state = self.state.read().await;
        Ok(state.tenant_groups.get(tenant).cloned().unwrap_or_default())
    }
}
