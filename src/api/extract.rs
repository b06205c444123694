//! Extractors whose rejections render as the API's JSON error body.

use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    FromRequest, FromRequestParts,
};

use crate::blockchain::models::ExplorerError;

/// `axum::extract::Query` rejecting with [`ExplorerError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ExplorerError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` rejecting with [`ExplorerError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ExplorerError))]
pub struct ApiPath<T>(pub T);

/// `axum::Json` rejecting with [`ExplorerError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ExplorerError))]
pub struct ApiJson<T>(pub T);

impl From<QueryRejection> for ExplorerError {
    fn from(rejection: QueryRejection) -> Self {
        ExplorerError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ExplorerError {
    fn from(rejection: PathRejection) -> Self {
        ExplorerError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ExplorerError {
    fn from(rejection: JsonRejection) -> Self {
        ExplorerError::BadRequest(rejection.body_text())
    }
}
