//! One-level group -> role expansion

use std::collections::HashSet;

use crate::types::{GroupId, GroupRoleMap, RoleId};

/// Expand group claims into the roles they grant.
///
/// Expansion is one level only: a group yields roles directly, and the
/// resulting roles are never themselves expanded. A group the map does not
/// know contributes no roles; that is not an error, it simply grants
/// nothing.
pub fn expand_groups(groups: &HashSet<GroupId>, map: &GroupRoleMap) -> HashSet<RoleId> {
    let mut roles = HashSet::new();
    for group in groups {
        if let Some(granted) = map.get(group) {
            roles.extend(granted.iter().cloned());
        }
    }
    roles
}
