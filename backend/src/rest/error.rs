//! Translation of extraction, validation and storage failures into HTTP responses.
//!
//! Error bodies always carry a `detail` key: a message string for 404 and
//! 500, a list of [`FieldError`] for 422.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::error::StorageError;

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// One offending input location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Where the problem is, e.g. `["body", "age"]`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|part| part.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sorry, but the kitten with id={0} was not found")]
    KittenNotFound(i64),

    #[error("Request validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::KittenNotFound(id) => ApiError::KittenNotFound(id),
            other => ApiError::Storage(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    loc: vec!["body".to_string(), field.to_string()],
                    msg: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                    kind: e.code.to_string(),
                })
            })
            .collect();
        // field_errors() is a HashMap; keep responses deterministic
        fields.sort_by(|a, b| a.loc.cmp(&b.loc));
        ApiError::Validation(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => text
                .strip_prefix(JSON_DATA_PREFIX)
                .and_then(field_from_serde_message),
            _ => None,
        };
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "json_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body",
        };

        let error = match field {
            Some(field) => FieldError::new(&["body", field.as_str()], text.clone(), kind),
            None => FieldError::new(&["body"], text.clone(), kind),
        };
        ApiError::Validation(vec![error])
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![FieldError::new(
            &["query"],
            rejection.body_text(),
            "query",
        )])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(vec![FieldError::new(
            &["path"],
            rejection.body_text(),
            "path",
        )])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::KittenNotFound(id) => {
                warn!("Kitten not found: {}", id);
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "detail": message })),
                )
                    .into_response()
            }
            ApiError::Validation(fields) => {
                warn!("Rejected request: {:?}", fields);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": fields })),
                )
                    .into_response()
            }
            ApiError::Storage(err) => {
                error!("Storage failure: {:?}", err);
                let detail = match err {
                    StorageError::ConstraintViolation(_) => "Database constraint violated",
                    _ => "Internal server error",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": detail })),
                )
                    .into_response()
            }
        }
    }
}

/// Pull the offending field out of a serde error message, either
/// "missing field `color` at ..." or "age: invalid type: ...".
fn field_from_serde_message(message: &str) -> Option<String> {
    if let Some(start) = message.find("missing field `") {
        let rest = &message[start + "missing field `".len()..];
        return rest.find('`').map(|end| rest[..end].to_string());
    }

    let (path, _) = message.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_missing_field_message() {
        let field = field_from_serde_message("missing field `color` at line 1 column 25");
        assert_eq!(field.as_deref(), Some("color"));
    }

    #[test]
    fn test_field_from_path_prefixed_message() {
        let field = field_from_serde_message(
            "age: invalid type: string \"old\", expected i32 at line 1 column 20",
        );
        assert_eq!(field.as_deref(), Some("age"));
    }

    #[test]
    fn test_no_field_for_root_type_error() {
        let field = field_from_serde_message("invalid type: sequence, expected struct CreateKittenRequest");
        assert_eq!(field, None);
    }

    #[test]
    fn test_storage_not_found_becomes_kitten_not_found() {
        let err: ApiError = StorageError::KittenNotFound(9).into();
        assert!(matches!(err, ApiError::KittenNotFound(9)));
        assert_eq!(err.to_string(), "Sorry, but the kitten with id=9 was not found");
    }

    #[test]
    fn test_status_codes() {
        let not_found = ApiError::KittenNotFound(1).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::Validation(vec![]).into_response();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let constraint =
            ApiError::from(StorageError::ConstraintViolation("FOREIGN KEY".to_string())).into_response();
        assert_eq!(constraint.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
