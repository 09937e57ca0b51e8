//! Immutable merged permission tables and published snapshots

use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::pattern::PathPattern;
use crate::types::{GroupRoleMap, PermissionEntry, TableScope, Verb};

/// One merged table entry: a validated pattern and, per verb, the set of
/// authority ids granting that verb
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pattern: PathPattern,
    grants: HashMap<Verb, HashSet<String>>,
}

impl TableEntry {
    /// The entry's validated pattern
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Verb -> granting-authorities view
    pub fn verb_grants(&self) -> &HashMap<Verb, HashSet<String>> {
        &self.grants
    }

    fn grants_verb_to_any(&self, verb: &str, authorities: &HashSet<String>) -> bool {
        self.grants
            .get(verb)
            .map_or(false, |granting| !granting.is_disjoint(authorities))
    }
}

/// Merged pattern -> verb -> authorities table for one scope.
///
/// Entries are merged by literal pattern string equality, never by semantic
/// pattern overlap: two different-looking patterns that happen to match the
/// same paths stay separate entries.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    entries: Vec<TableEntry>,
    index: HashMap<String, usize>,
}

impl PermissionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Union one authority's grants into the table.
    ///
    /// A malformed pattern skips that single entry with a build-time
    /// warning; the rest of the merge proceeds. Set unions keyed by the
    /// literal pattern string keep the merge order-independent.
    pub fn merge_authority(&mut self, authority: &str, entries: &[PermissionEntry]) {
        for entry in entries {
            let pattern = match PathPattern::parse(&entry.pattern) {
                Ok(pattern) => pattern,
                Err(err) => {
                    warn!(
                        pattern = %entry.pattern,
                        authority,
                        error = %err,
                        "skipping grant with malformed pattern"
                    );
                    continue;
                }
            };

            let slot = match self.index.get(&entry.pattern) {
                Some(&slot) => slot,
                None => {
                    self.entries.push(TableEntry {
                        pattern,
                        grants: HashMap::new(),
                    });
                    let slot = self.entries.len() - 1;
                    self.index.insert(entry.pattern.clone(), slot);
                    slot
                }
            };

            let grants = &mut self.entries[slot].grants;
            for verb in &entry.verbs {
                grants
                    .entry(verb.clone())
                    .or_default()
                    .insert(authority.to_string());
            }
        }
    }

    /// Any-match union lookup: true iff any entry whose pattern matches
    /// `path` grants `verb` to at least one of `authorities`.
    pub fn grants(&self, path: &str, verb: &str, authorities: &HashSet<String>) -> bool {
        if authorities.is_empty() {
            return false;
        }

        self.entries
            .iter()
            .any(|entry| entry.grants_verb_to_any(verb, authorities) && entry.pattern.matches(path))
    }

    /// Entry for one literal pattern string, if present
    pub fn entry(&self, pattern: &str) -> Option<&TableEntry> {
        self.index.get(pattern).map(|&slot| &self.entries[slot])
    }

    /// Number of distinct patterns in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully built, never-mutated permission table plus its generation.
///
/// Once published a snapshot is immutable; an update produces a new
/// snapshot and replacement is a single pointer swap, so readers always
/// observe one complete, self-consistent generation.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    scope: TableScope,
    generation: u64,
    table: PermissionTable,
    group_roles: GroupRoleMap,
}

impl TableSnapshot {
    pub(crate) fn new(
        scope: TableScope,
        generation: u64,
        table: PermissionTable,
        group_roles: GroupRoleMap,
    ) -> Self {
        Self {
            scope,
            generation,
            table,
            group_roles,
        }
    }

    pub fn scope(&self) -> &TableScope {
        &self.scope
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// The group -> role map captured for this snapshot's scope at build
    /// time, so evaluation never performs provider I/O
    pub fn group_roles(&self) -> &GroupRoleMap {
        &self.group_roles
    }
}
