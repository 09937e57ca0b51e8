//! Core grant-model types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Unique role identifier
pub type RoleId = String;

/// Multi-tenancy partition identifier
pub type TenantId = String;

/// Group identifier
pub type GroupId = String;

/// Logical permission name (`read`, `create`, `update`, `delete`, or custom)
pub type Verb = String;

/// One wildcarded resource grant: a path pattern and the verbs allowed on
/// paths it matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Glob path pattern (e.g. "/admin/**")
    pub pattern: String,

    /// Verbs granted on matching paths
    pub verbs: HashSet<Verb>,
}

impl PermissionEntry {
    /// Create a new permission entry
    pub fn new(
        pattern: impl Into<String>,
        verbs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            verbs: verbs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Raw shape returned by the resource provider: authority id -> grants
pub type RoleResourceMap = HashMap<RoleId, Vec<PermissionEntry>>;

/// Group -> roles the group expands to
pub type GroupRoleMap = HashMap<GroupId, HashSet<RoleId>>;

/// The table a build or lookup addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableScope {
    /// The tenant-independent table
    Global,

    /// One tenant's table
    Tenant(TenantId),

    /// Table derived from a set of scope names
    ScopeSet(BTreeSet<String>),
}

impl fmt::Display for TableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Tenant(id) => write!(f, "tenant:{}", id),
            Self::ScopeSet(names) => {
                let joined = names.iter().cloned().collect::<Vec<_>>().join(",");
                write!(f, "scopes:{}", joined)
            }
        }
    }
}
