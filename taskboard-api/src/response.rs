/// Success envelope
///
/// ```json
/// { "message": "Projects retrieved successfully", "data": [...], "pagination": {...} }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use taskboard_shared::pagination::{Page, Pagination};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,

    pub data: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
            pagination: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with `data`
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 with a page of items and its pagination block
    pub fn page(message: impl Into<String>, page: Page<T>) -> Self {
        Self {
            pagination: Some(page.pagination),
            ..Self::ok(message, page.items)
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`
    pub fn empty(message: impl Into<String>) -> Self {
        Self::ok(message, ())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
