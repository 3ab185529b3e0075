//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches
//! - Joined read views where the API exposes related names

pub mod category;
pub mod comment;
pub mod genre;
pub mod review;
pub mod title;
pub mod user;
