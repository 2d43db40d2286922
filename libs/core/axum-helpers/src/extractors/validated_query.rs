use super::fields::{FieldReader, FromFields};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use validator::Validate;

/// Query string read field by field and validated.
///
/// Wrong types (`perPage=abc`) and rule failures both reject with 422 and a
/// field to messages map. Only a query string that cannot be decoded at all
/// falls back to the query rejection.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: FromFields + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        let mut fields = FieldReader::from_pairs(pairs);
        let data = T::from_fields(&mut fields);
        fields.finish(&data)?;
        Ok(ValidatedQuery(data))
    }
}
