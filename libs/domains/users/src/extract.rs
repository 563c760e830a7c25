//! JSON extractor that reports malformed bodies as validation errors.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::UserError;

/// `Json<T>` followed by `Validate`
///
/// A body that fails to parse (missing field, wrong type, bad syntax, wrong
/// content type) is rejected with `UserError::Validation` so it gets the same
/// 400 and error body as a failed field rule.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| UserError::Validation(rejection.body_text()))?;

        data.validate()?;

        Ok(ValidatedJson(data))
    }
}
