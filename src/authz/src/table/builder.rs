//! Snapshot construction from the resource provider
//!
//! A build fetches the scope's role grants (and the group map the scope
//! resolves groups through), merges them, and produces one complete
//! snapshot or fails entirely. No partial table is ever published.

use tracing::debug;

use super::snapshot::{PermissionTable, TableSnapshot};
use crate::error::Result;
use crate::provider::ResourceProvider;
use crate::types::{GroupRoleMap, TableScope};

pub(super) async fn build_snapshot(
    provider: &dyn ResourceProvider,
    scope: &TableScope,
    generation: u64,
) -> Result<TableSnapshot> {
    let (role_map, group_roles) = match scope {
        TableScope::Global => (
            provider.global_role_resources().await?,
            provider.global_group_roles().await?,
        ),
        TableScope::Tenant(id) => (
            provider.tenant_role_resources(id).await?,
            provider.tenant_group_roles(id).await?,
        ),
        // Scope-set tables resolve no groups; groups expand through the
        // global or tenant map only.
        TableScope::ScopeSet(names) => (
            provider.scope_role_resources(names).await?,
            GroupRoleMap::new(),
        ),
    };

    let mut table = PermissionTable::new();
    for (authority, entries) in &role_map {
        table.merge_authority(authority, entries);
    }

    debug!(
        scope = %scope,
        generation,
        patterns = table.len(),
        "built permission table"
    );

    Ok(TableSnapshot::new(
        scope.clone(),
        generation,
        table,
        group_roles,
    ))
}
