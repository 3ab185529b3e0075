//! Permission predicates evaluated by the HTTP layer.
//!
//! Anonymous visitors may read every catalog and content endpoint; these
//! functions decide what an *authenticated* user may change.

use crate::roles::{is_admin, is_moderator};
use crate::types::DbId;

/// Categories, genres and titles are writable by administrators only.
pub fn can_write_catalog(role: &str) -> bool {
    is_admin(role)
}

/// Reviews and comments may be edited or deleted by their author, by a
/// moderator, or by an administrator.
pub fn can_modify_content(role: &str, user_id: DbId, author_id: DbId) -> bool {
    user_id == author_id || is_moderator(role) || is_admin(role)
}

/// The `/users` collection is restricted to administrators.
pub fn can_manage_users(role: &str) -> bool {
    is_admin(role)
}
