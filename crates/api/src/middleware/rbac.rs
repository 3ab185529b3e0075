//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement: 401 without a valid token, 403 with the wrong role.
//! Ownership rules for reviews and comments depend on the row being edited
//! and are checked in the handlers instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{can_manage_users, can_write_catalog};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_manage_users(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires a role that may create and delete categories, genres and titles.
pub struct RequireCatalogEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireCatalogEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_write_catalog(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only administrators may change the catalog".into(),
            )));
        }
        Ok(RequireCatalogEditor(user))
    }
}
