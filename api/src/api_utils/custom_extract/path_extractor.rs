use axum::{
    async_trait,
    extract::{path::ErrorKind, rejection::PathRejection, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;

use abi::errors::Error;

/// `axum::extract::Path` with rejections rendered as the api's error body
pub struct PathExtractor<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathExtractor<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(PathRejection::FailedToDeserializePathParams(inner)) => {
                if let ErrorKind::UnsupportedType { .. } = inner.kind() {
                    // handler declared a type serde can't read from a path
                    return Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Error::internal_with_details(inner.body_text()),
                    ));
                }
                Err((StatusCode::BAD_REQUEST, Error::path_parsing(inner)))
            }
            Err(rejection) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Error::internal_with_details(format!("Unhandled path rejection: {rejection}")),
            )),
        }
    }
}
