/// Extractors that deserialize and validate before the handler runs
///
/// Failures become `ApiError::Validation` with paths prefixed by the request
/// part (`body.name`, `query.limit`). Undeserializable input is reported
/// against the part itself (`body`, `query`).
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, ValidationErrorDetail};

/// JSON body that passed `Validate`
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

/// Query string that passed `Validate`
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| malformed("body", rejection.body_text()))?;

        value.validate().map_err(|e| validation_error("body", &e))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| malformed("query", rejection.body_text()))?;

        value.validate().map_err(|e| validation_error("query", &e))?;
        Ok(Self(value))
    }
}

fn malformed(part: &str, message: String) -> ApiError {
    ApiError::Validation(vec![ValidationErrorDetail {
        path: part.to_string(),
        message,
    }])
}

/// Flattens field errors into `part.fieldName` details
pub fn validation_error(part: &str, errors: &ValidationErrors) -> ApiError {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            let path = format!("{}.{}", part, camel_case(field));
            errors.iter().map(move |error| ValidationErrorDetail {
                path: path.clone(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.path.cmp(&b.path));
    ApiError::Validation(details)
}

/// `project_id` → `projectId`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
