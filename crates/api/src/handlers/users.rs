//! Handlers for the `/users` resource.
//!
//! The collection and `/users/{username}` are restricted to administrators.
//! `/users/me` lets any authenticated user read and edit their own profile,
//! except for the role.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::roles::ROLE_USER;
use yamdb_core::validation::{validate_input, validate_role, validate_username};
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    /// Defaults to `user`.
    pub role: Option<String>,
}

/// Request body for `PATCH /users/{username}`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    /// Collect every validation failure of this patch.
    fn validate_fields(&self) -> Result<(), CoreError> {
        let mut errors = validate_input(self);
        if let Some(ref username) = self.username {
            errors.check("username", validate_username(username));
        }
        if let Some(ref role) = self.role {
            errors.check("role", validate_role(role));
        }
        errors.into_result()
    }

    fn into_update(self) -> UpdateUser {
        UpdateUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role,
        }
    }
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users?search=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.resolve();
    let search = params.term();
    let users = UserRepo::list(&state.pool, search, limit, offset).await?;
    let count = UserRepo::count(&state.pool, search).await?;
    let results: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(Json(Page::new(count, results)))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = validate_input(&input);
    errors.check("username", validate_username(&input.username));
    if let Some(ref role) = input.role {
        errors.check("role", validate_role(role));
    }
    errors.into_result()?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
            role: input.role.unwrap_or_else(|| ROLE_USER.to_string()),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/users/{username}
pub async fn get_by_username(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/{username}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(username): AppPath<String>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = find_user(&state, &username).await?;
    input.validate_fields()?;

    let updated = UserRepo::update(&state.pool, user.id, &input.into_update())
        .await?
        .ok_or_else(|| not_found(&username))?;

    tracing::info!(user_id = updated.id, admin_id = admin.user_id, "User updated");
    Ok(Json(UserResponse::from(&updated)))
}

/// DELETE /api/v1/users/{username}
///
/// The user's reviews and comments are deleted with the account.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(username): AppPath<String>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete_by_username(&state.pool, &username).await? {
        return Err(not_found(&username));
    }
    tracing::info!(username = %username, admin_id = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Self-service handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}

/// PATCH /api/v1/users/me
///
/// Same fields as the admin update; `role` is ignored.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let input = UpdateUserRequest {
        role: None,
        ..input
    };
    input.validate_fields()?;

    let updated = UserRepo::update(&state.pool, auth.user_id, &input.into_update())
        .await?
        .ok_or_else(|| not_found(&auth.user.username))?;

    tracing::info!(user_id = updated.id, "Profile updated");
    Ok(Json(UserResponse::from(&updated)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(username: &str) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "User",
        key: username.to_string(),
    })
}

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| not_found(username))
}
