//! Handlers for the `/auth` resource (signup, token).
//!
//! Signup mails a single-use confirmation code; exchanging it for a token
//! proves ownership of the address. There are no passwords.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_core::confirmation::{generate_code, verify_code};
use yamdb_core::error::CoreError;
use yamdb_core::validation::{validate_input, validate_not_blank, validate_username, FieldErrors};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_mail::confirmation_message;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

const INVALID_CODE_MESSAGE: &str = "Invalid or expired confirmation code.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: String,
    #[serde(default)]
    pub username: String,
}

/// Response body for `POST /auth/signup`: echoes the registered pair.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub email: String,
    pub username: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a user (or re-issue a code to an existing exact username/email
/// pair) and mail a fresh confirmation code.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    let mut errors = validate_input(&input);
    errors.check("username", validate_username(&input.username));
    errors.into_result()?;

    let user = find_or_create_signup_user(&state, &input).await?;

    let (code, code_hash) = generate_code();
    let expires_at = Utc::now() + Duration::minutes(state.config.confirmation_code_ttl_mins);
    UserRepo::set_confirmation_code(&state.pool, user.id, &code_hash, expires_at).await?;

    state
        .mailer
        .send(&confirmation_message(&user.email, &user.username, &code))
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Confirmation code issued");

    Ok(Json(SignupResponse {
        email: user.email,
        username: user.username,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a username and confirmation code for an access token. The code
/// is consumed on success.
pub async fn token(
    State(state): State<AppState>,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let mut errors = FieldErrors::new();
    errors.check("username", validate_username(&input.username));
    errors.check("confirmation_code", validate_not_blank(&input.confirmation_code));
    errors.into_result()?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::NotFoundByKey {
            entity: "User",
            key: input.username.clone(),
        })?;

    let valid = verify_code(
        &input.confirmation_code,
        user.confirmation_code_hash.as_deref(),
        user.confirmation_code_expires_at,
        Utc::now(),
    );
    let stored_hash = match (valid, user.confirmation_code_hash.as_deref()) {
        (true, Some(hash)) => hash,
        _ => return Err(invalid_code()),
    };

    // A concurrent exchange of the same code may have consumed it already.
    if !UserRepo::clear_confirmation_code(&state.pool, user.id, stored_hash).await? {
        return Err(invalid_code());
    }

    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the signup target.
///
/// An existing user matching both username and email is reused. A username
/// or email that belongs to someone else is a field error. Otherwise a new
/// `user`-role account is created.
async fn find_or_create_signup_user(state: &AppState, input: &SignupRequest) -> AppResult<User> {
    let by_username = UserRepo::find_by_username(&state.pool, &input.username).await?;
    let by_email = UserRepo::find_by_email(&state.pool, &input.email).await?;

    match (by_username, by_email) {
        (Some(existing), Some(same)) if existing.id == same.id => Ok(existing),
        (None, None) => {
            let user =
                UserRepo::create(&state.pool, &CreateUser::signup(&input.username, &input.email))
                    .await?;
            tracing::info!(user_id = user.id, username = %user.username, "User registered");
            Ok(user)
        }
        (by_username, by_email) => {
            let mut errors = FieldErrors::new();
            if by_username.is_some() {
                errors.add("username", "A user with that username already exists.");
            }
            if by_email.is_some() {
                errors.add("email", "A user with that email already exists.");
            }
            Err(CoreError::InvalidFields(errors).into())
        }
    }
}

fn invalid_code() -> AppError {
    CoreError::InvalidFields(FieldErrors::single("confirmation_code", INVALID_CODE_MESSAGE)).into()
}
