//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- The authenticated user behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role for user management.
//! - [`rbac::RequireCatalogEditor`] -- Requires a role allowed to edit the catalog.

pub mod auth;
pub mod rbac;
