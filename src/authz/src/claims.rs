//! Claim-token classification into typed authority buckets
//!
//! A principal's raw claim set mixes authorization claims with unrelated
//! tokens. Classification inspects a fixed prefix on each token and places
//! it into the matching bucket; tokens with no recognized prefix are dropped
//! with a warning, never an error.

use std::collections::HashSet;
use tracing::warn;

use crate::types::{GroupId, RoleId, TenantId};

const ROLE_PREFIX: &str = "ROLE_";
const TENANT_PREFIX: &str = "TENANT_";
const SCOPE_PREFIX: &str = "SCOPE_";
const GROUP_PREFIX: &str = "GROUP_";

/// Kind of a recognized authority token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Role,
    Tenant,
    Scope,
    Group,
}

/// A tagged claim string: the kind plus the payload after the prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorityToken {
    pub kind: TokenKind,
    pub payload: String,
}

impl AuthorityToken {
    /// Parse a raw claim token.
    ///
    /// Returns `None` for tokens with no recognized prefix or an empty
    /// payload; callers treat those as unrelated claims.
    pub fn parse(raw: &str) -> Option<Self> {
        let (kind, payload) = if let Some(rest) = raw.strip_prefix(ROLE_PREFIX) {
            (TokenKind::Role, rest)
        } else if let Some(rest) = raw.strip_prefix(TENANT_PREFIX) {
            (TokenKind::Tenant, rest)
        } else if let Some(rest) = raw.strip_prefix(SCOPE_PREFIX) {
            (TokenKind::Scope, rest)
        } else if let Some(rest) = raw.strip_prefix(GROUP_PREFIX) {
            (TokenKind::Group, rest)
        } else {
            return None;
        };

        if payload.is_empty() {
            return None;
        }

        Some(Self {
            kind,
            payload: payload.to_string(),
        })
    }
}

/// The classified authority set for one evaluation
///
/// Invariant: at most one tenant token. A context claiming more than one
/// distinct tenant is ambiguous and evaluates to "no permissions".
#[derive(Debug, Clone, Default)]
pub struct PrincipalContext {
    roles: HashSet<RoleId>,
    tenants: HashSet<TenantId>,
    scopes: HashSet<String>,
    groups: HashSet<GroupId>,
}

impl PrincipalContext {
    /// An anonymous principal with no authorities
    pub fn empty() -> Self {
        Self::default()
    }

    /// Classify raw claim tokens into the four buckets.
    ///
    /// Tokens with no recognized prefix are dropped and logged; malformed
    /// or unrelated claims are expected to coexist with authorization
    /// claims.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ctx = Self::default();
        for raw in tokens {
            let raw = raw.as_ref();
            match AuthorityToken::parse(raw) {
                Some(token) => ctx.insert(token),
                None => warn!(token = raw, "dropping claim token with unrecognized prefix"),
            }
        }
        ctx
    }

    /// Place one classified token into its bucket
    pub fn insert(&mut self, token: AuthorityToken) {
        match token.kind {
            TokenKind::Role => {
                self.roles.insert(token.payload);
            }
            TokenKind::Tenant => {
                self.tenants.insert(token.payload);
            }
            TokenKind::Scope => {
                self.scopes.insert(token.payload);
            }
            TokenKind::Group => {
                self.groups.insert(token.payload);
            }
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenants.insert(tenant.into());
        self
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn roles(&self) -> &HashSet<RoleId> {
        &self.roles
    }

    pub fn scopes(&self) -> &HashSet<String> {
        &self.scopes
    }

    pub fn groups(&self) -> &HashSet<GroupId> {
        &self.groups
    }

    /// The principal's tenant, if exactly one tenant token was claimed
    pub fn tenant(&self) -> Option<&TenantId> {
        if self.tenants.len() == 1 {
            self.tenants.iter().next()
        } else {
            None
        }
    }

    /// True when more than one distinct tenant token was claimed
    pub fn tenant_ambiguous(&self) -> bool {
        self.tenants.len() > 1
    }

    /// True when the context carries no roles, scopes, or groups
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.scopes.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_token_parsing() {
        let token = AuthorityToken::parse("ROLE_ADMIN").unwrap();
        assert_eq!(token.kind, TokenKind::Role);
        assert_eq!(token.payload, "ADMIN");

        let token = AuthorityToken::parse("TENANT_42").unwrap();
        assert_eq!(token.kind, TokenKind::Tenant);
        assert_eq!(token.payload, "42");

        let token = AuthorityToken::parse("SCOPE_read").unwrap();
        assert_eq!(token.kind, TokenKind::Scope);
        assert_eq!(token.payload, "read");

        let token = AuthorityToken::parse("GROUP_ops").unwrap();
        assert_eq!(token.kind, TokenKind::Group);
        assert_eq!(token.payload, "ops");
    }

    #[test]
    fn test_unrecognized_tokens_dropped() {
        assert!(AuthorityToken::parse("email:alice@example.com").is_none());
        assert!(AuthorityToken::parse("role_admin").is_none());
        assert!(AuthorityToken::parse("").is_none());
        assert!(AuthorityToken::parse("ROLE_").is_none());
    }

    #[test]
    fn test_classification_buckets() {
        let ctx = PrincipalContext::from_tokens([
            "ROLE_ADMIN",
            "ROLE_EDITOR",
            "TENANT_42",
            "SCOPE_read",
            "GROUP_ops",
            "session:deadbeef",
        ]);

        assert_eq!(ctx.roles().len(), 2);
        assert!(ctx.roles().contains("ADMIN"));
        assert_eq!(ctx.tenant(), Some(&"42".to_string()));
        assert!(ctx.scopes().contains("read"));
        assert!(ctx.groups().contains("ops"));
        assert!(!ctx.is_empty());
    }

    #[test]
    fn test_duplicate_tenant_token_is_not_ambiguous() {
        let ctx = PrincipalContext::from_tokens(["TENANT_42", "TENANT_42", "ROLE_ADMIN"]);
        assert!(!ctx.tenant_ambiguous());
        assert_eq!(ctx.tenant(), Some(&"42".to_string()));
    }

    #[test]
    fn test_conflicting_tenant_tokens_are_ambiguous() {
        let ctx = PrincipalContext::from_tokens(["TENANT_42", "TENANT_7"]);
        assert!(ctx.tenant_ambiguous());
        assert_eq!(ctx.tenant(), None);
    }

    #[test]
    fn test_empty_context() {
        let ctx = PrincipalContext::empty();
        assert!(ctx.is_empty());
        assert_eq!(ctx.tenant(), None);
    }

    proptest! {
        /// Classification is a total, deterministic partition: every token
        /// lands in exactly one of {Role, Tenant, Scope, Group, Dropped}.
        #[test]
        fn prop_classification_is_a_partition(raw in "\\PC{0,24}") {
            let ctx = PrincipalContext::from_tokens([raw.as_str()]);
            let bucketed = ctx.roles().len()
                + if ctx.tenant().is_some() { 1 } else { 0 }
                + ctx.scopes().len()
                + ctx.groups().len();

            let recognized = AuthorityToken::parse(&raw).is_some();
            prop_assert_eq!(bucketed, usize::from(recognized));

            // Deterministic: classifying twice gives the same buckets.
            let again = PrincipalContext::from_tokens([raw.as_str()]);
            prop_assert_eq!(ctx.roles(), again.roles());
            prop_assert_eq!(ctx.scopes(), again.scopes());
            prop_assert_eq!(ctx.groups(), again.groups());
        }

        #[test]
        fn prop_prefixed_tokens_always_classify(payload in "[A-Za-z0-9]{1,12}") {
            for (prefix, kind) in [
                ("ROLE_", TokenKind::Role),
                ("TENANT_", TokenKind::Tenant),
                ("SCOPE_", TokenKind::Scope),
                ("GROUP_", TokenKind::Group),
            ] {
                let token = AuthorityToken::parse(&format!("{}{}", prefix, payload)).unwrap();
                prop_assert_eq!(token.kind, kind);
                prop_assert_eq!(token.payload.as_str(), payload.as_str());
            }
        }
    }
}
