//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20240101000001_create_users.sql`.

pub const ROLE_USER: &str = "user";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_ADMIN: &str = "admin";

/// Every role a user may hold.
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_MODERATOR, ROLE_ADMIN];

pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

pub fn is_moderator(role: &str) -> bool {
    role == ROLE_MODERATOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        for role in VALID_ROLES {
            assert!(is_valid_role(role));
        }
    }

    #[test]
    fn unknown_role_is_invalid() {
        assert!(!is_valid_role("superuser"));
        assert!(!is_valid_role("Admin"));
        assert!(!is_valid_role(""));
    }

    #[test]
    fn derived_flags() {
        assert!(is_admin("admin"));
        assert!(!is_admin("moderator"));
        assert!(is_moderator("moderator"));
        assert!(!is_moderator("user"));
    }
}
