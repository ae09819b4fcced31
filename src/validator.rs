//! JSON body extraction with `validator` rules applied.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use todo_core::AppError;
use validator::{Validate, ValidationErrors};

/// Joins field messages in field order so the output is stable.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request(anyhow!("Missing 'Content-Type: application/json' header"))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request(anyhow!("Malformed JSON body")),
        JsonRejection::JsonDataError(err) => {
            let text = err.body_text();
            match text
                .split("missing field `")
                .nth(1)
                .and_then(|s| s.split('`').next())
            {
                Some(field) => AppError::bad_request(anyhow!("{} is required", field)),
                None => AppError::bad_request(anyhow!("Invalid field type in request")),
            }
        }
        _ => AppError::bad_request(anyhow!("Invalid request body")),
    }
}

/// Like [`Json`], but runs [`Validate`] and maps every failure to an [`AppError`].
///
/// Body problems are 400; rule violations are 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 3, message = "Name is too short"))]
        name: String,
    }

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload() {
        let req = json_request(r#"{"email":"a@test.com","name":"kim"}"#);
        let ValidatedJson(payload) = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(payload.name, "kim");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let req = json_request(r#"{"email":"a@test.com"}"#);
        let err = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "name is required");
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let req = json_request(r#"{"email":"#);
        let err = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"email":"a@test.com","name":"kim"}"#))
            .unwrap();
        let err = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rule_violations_are_unprocessable() {
        let req = json_request(r#"{"email":"nope","name":"x"}"#);
        let err = ValidatedJson::<Payload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.client_message(), "Invalid email format, Name is too short");
    }
}
