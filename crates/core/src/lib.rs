//! Domain primitives shared by the database and HTTP layers.
//!
//! Nothing in this crate performs I/O: roles, error types, validation rules,
//! permission predicates and confirmation-code helpers are all pure.

pub mod confirmation;
pub mod error;
pub mod pagination;
pub mod permissions;
pub mod roles;
pub mod types;
pub mod validation;
