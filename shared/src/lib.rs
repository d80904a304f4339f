use serde::{Deserialize, Serialize};
use validator::Validate;

/// A cat breed as exposed over the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub id: i64,
    pub name: String,
}

/// A kitten together with its breed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kitten {
    pub color: String,
    pub age: i32,
    pub description: Option<String>,
    pub id: i64,
    pub breed: Breed,
}

/// Body of `POST /api/v1/kittens`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateKittenRequest {
    #[validate(length(max = 50, message = "color cannot exceed 50 characters"))]
    pub color: String,
    pub age: i32,
    /// Optional free text; may be omitted or null
    #[serde(default)]
    #[validate(length(max = 1000, message = "description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    pub breed_id: i64,
}

/// Body of `PATCH /api/v1/kittens/{id}`
///
/// Every field is optional. Absent and `null` fields leave the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateKittenRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "color cannot exceed 50 characters"))]
    pub color: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub breed_id: Option<i64>,
}

/// Confirmation payload returned by mutating endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsResponse {
    pub details: String,
}

impl DetailsResponse {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kitten_serializes_with_embedded_breed() {
        let kitten = Kitten {
            color: "Gray".to_string(),
            age: 2,
            description: None,
            id: 1,
            breed: Breed {
                id: 1,
                name: "Chantilly-Tiffany".to_string(),
            },
        };

        let value = serde_json::to_value(&kitten).unwrap();
        assert_eq!(
            value,
            json!({
                "color": "Gray",
                "age": 2,
                "description": null,
                "id": 1,
                "breed": {"id": 1, "name": "Chantilly-Tiffany"}
            })
        );
    }

    #[test]
    fn test_create_request_description_is_optional() {
        let request: CreateKittenRequest =
            serde_json::from_value(json!({"color": "White", "age": 3, "breed_id": 2})).unwrap();
        assert_eq!(request.description, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_requires_breed_id() {
        let result: Result<CreateKittenRequest, _> =
            serde_json::from_value(json!({"color": "White", "age": 3}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("breed_id"), "unexpected error: {}", err);
    }

    #[test]
    fn test_create_request_rejects_long_color() {
        let request = CreateKittenRequest {
            color: "x".repeat(51),
            age: 1,
            description: None,
            breed_id: 1,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("color"));
    }

    #[test]
    fn test_create_request_accepts_any_short_color_and_integer_age() {
        let request = CreateKittenRequest {
            color: String::new(),
            age: -1,
            description: None,
            breed_id: 1,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_accepts_any_subset() {
        let request: UpdateKittenRequest = serde_json::from_value(json!({"age": 10})).unwrap();
        assert_eq!(request.age, Some(10));
        assert!(request.color.is_none());
        assert!(request.validate().is_ok());

        let empty: UpdateKittenRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, UpdateKittenRequest::default());
    }

    #[test]
    fn test_update_request_validates_present_fields_only() {
        let request = UpdateKittenRequest {
            color: Some("x".repeat(51)),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("color"));
        assert!(!errors.field_errors().contains_key("description"));
    }
}
