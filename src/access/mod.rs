//! # Access Control
//!
//! Caller identity and the resolution of that identity into a visibility
//! predicate. Scope is enforced at planning time: the resolver output is
//! conjoined with caller filters before any statement is compiled, so no
//! row outside the caller's scope can appear in a result set.

pub mod principal;
pub mod resolver;

pub use principal::{PermissionGrant, Principal, UserRef};
pub use resolver::{AccessScopeResolver, ScopeDirectory};
