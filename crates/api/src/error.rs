use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use yamdb_core::error::CoreError;
use yamdb_core::validation::FieldErrors;
use yamdb_mail::MailError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses:
///
/// ```json
/// { "error": "...", "code": "VALIDATION_ERROR", "fields": { "score": ["..."] } }
/// ```
///
/// `fields` is present only for field-level validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `yamdb_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body was not valid JSON for the target type.
    #[error("Invalid request body: {0}")]
    JsonBody(#[from] JsonRejection),

    /// A path segment did not match the expected type.
    #[error("Invalid path: {0}")]
    Path(#[from] PathRejection),

    /// The query string could not be deserialized.
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    /// Sending an email failed.
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code, message and optional per-field messages.
type ErrorParts = (StatusCode, &'static str, String, Option<FieldErrors>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- Request body ---
            AppError::JsonBody(rejection) => {
                let status = match &rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, "BAD_REQUEST", rejection.body_text(), None)
            }
            AppError::Path(rejection) => match rejection {
                PathRejection::FailedToDeserializePathParams(_) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    rejection.body_text(),
                    None,
                ),
                other => {
                    tracing::error!(error = %other.body_text(), "Path extraction failed");
                    internal()
                }
            },
            AppError::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                rejection.body_text(),
                None,
            ),

            // --- Mail delivery ---
            AppError::Mail(err) => {
                tracing::error!(error = %err, "Mail delivery failed");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

fn classify_core_error(core: CoreError) -> ErrorParts {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
            None,
        ),
        CoreError::NotFoundByKey { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
            None,
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
        CoreError::InvalidFields(fields) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            fields.to_string(),
            Some(fields),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP response.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints map to 400 with a field error
///   named after the constrained column.
/// - Check violations on `ck_*` constraints map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique_violation
                Some("23505") if constraint.starts_with("uq_") => {
                    let fields = unique_violation_fields(constraint);
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        fields.to_string(),
                        Some(fields),
                    )
                }
                // PostgreSQL check_violation
                Some("23514") if constraint.starts_with("ck_") => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Value violates check constraint: {constraint}"),
                    None,
                ),
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// Translate a unique-constraint name into the field error a client sees.
fn unique_violation_fields(constraint: &str) -> FieldErrors {
    match constraint {
        "uq_users_username" => {
            FieldErrors::single("username", "A user with that username already exists.")
        }
        "uq_users_email" => FieldErrors::single("email", "A user with that email already exists."),
        "uq_categories_slug" => {
            FieldErrors::single("slug", "A category with this slug already exists.")
        }
        "uq_genres_slug" => FieldErrors::single("slug", "A genre with this slug already exists."),
        "uq_reviews_author_title" => FieldErrors::single(
            FieldErrors::NON_FIELD,
            "You have already reviewed this title.",
        ),
        other => FieldErrors::single(
            FieldErrors::NON_FIELD,
            format!("Duplicate value violates unique constraint: {other}"),
        ),
    }
}
