//! # Warden Authorization Engine
//!
//! Claims-driven access-control decision engine: classifies prefix-tagged
//! authority claims, expands group membership into roles, and evaluates
//! path/verb requests against atomically published permission-table
//! snapshots.
//!
//! ## Features
//!
//! - **Typed claim classification** of `ROLE_`/`TENANT_`/`SCOPE_`/`GROUP_`
//!   tokens; unrelated claims are dropped, never an error
//! - **Glob path matching** with `*` (one segment) and trailing `**`
//!   (variable depth)
//! - **Lock-free reads**: decisions load one atomic snapshot reference and
//!   never block writers or each other
//! - **Coalesced rebuilds**: a burst of change notifications during one
//!   build costs at most one follow-up build
//! - **Fail-closed evaluation**: missing data always resolves to deny, and
//!   a failed rebuild keeps the last good table live
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_authz::{AccessEngine, InMemoryResourceProvider, PermissionEntry, PrincipalContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = InMemoryResourceProvider::new();
//!     provider
//!         .grant_global("ADMIN", vec![PermissionEntry::new("/admin/**", ["read", "write"])])
//!         .await;
//!
//!     let engine = AccessEngine::new(Arc::new(provider)).await?;
//!
//!     let principal = PrincipalContext::from_tokens(["ROLE_ADMIN", "SCOPE_read"]);
//!     assert!(engine.allowed(&principal, "/admin/users", "GET").await);
//!     assert!(!engine.allowed(&PrincipalContext::empty(), "/admin/users", "GET").await);
//!     Ok(())
//! }
//! ```

pub mod claims;
pub mod engine;
pub mod error;
pub mod groups;
pub mod pattern;
pub mod provider;
pub mod table;
pub mod types;

// Re-export commonly used types
pub use claims::{AuthorityToken, PrincipalContext, TokenKind};
pub use engine::{AccessEngine, EngineConfig, UpdateTrigger, VerbMap};
pub use error::{AuthzError, Result};
pub use pattern::{PathPattern, PatternError};
pub use provider::{InMemoryResourceProvider, ResourceProvider};
pub use table::{CoordinatorStats, PermissionTable, TableSnapshot};
pub use types::{GroupRoleMap, PermissionEntry, RoleResourceMap, TableScope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
