/**
 * Request Body Extractors
 *
 * Thin wrappers over axum's `Json` and `Multipart` extractors whose
 * rejection is `ApiError`. A body with the wrong content type, invalid JSON
 * or a size over `DefaultBodyLimit` is answered with the usual
 * `{ statusCode, message, success: false, errors: [] }` body.
 */

use axum::{
    extract::{FromRequest, Multipart, Request},
    extract::rejection::JsonRejection,
    Json,
};

use crate::backend::error::ApiError;

/// JSON request body
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `multipart/form-data` request body
#[derive(Debug)]
pub struct MultipartBody(pub Multipart);

impl<S> FromRequest<S> for MultipartBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Ok(Self(multipart))
    }
}
