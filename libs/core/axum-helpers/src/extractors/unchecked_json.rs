use super::fields::{FieldReader, FromFields};
use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::Serialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

/// JSON object body read field by field but not yet validated.
///
/// Extraction only fails when the body is not a JSON object. Wrong field
/// types and rule failures are both reported by [`Unchecked::validate`], so a
/// service can log the request as received before deciding whether it is
/// acceptable.
#[derive(Debug)]
pub struct Unchecked<T> {
    value: T,
    raw: Value,
    fields: FieldReader,
}

impl<T: FromFields> Unchecked<T> {
    /// `None` when `raw` is not a JSON object.
    pub fn from_json(raw: Value) -> Option<Self> {
        let mut fields = FieldReader::from_json(raw.clone())?;
        let value = T::from_fields(&mut fields);
        Some(Self { value, raw, fields })
    }
}

impl<T: Validate> Unchecked<T> {
    /// The body exactly as the client sent it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn validate(self) -> Result<T, ValidationErrors> {
        self.fields.finish(&self.value)?;
        Ok(self.value)
    }
}

/// Already-typed input, as built by other services and tests.
impl<T: Serialize> From<T> for Unchecked<T> {
    fn from(value: T) -> Self {
        let raw = serde_json::to_value(&value).unwrap_or(Value::Null);
        Self {
            value,
            raw,
            fields: FieldReader::default(),
        }
    }
}

impl<T, S> FromRequest<S> for Unchecked<T>
where
    T: FromFields,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state).await?;
        Self::from_json(raw)
            .ok_or_else(|| AppError::BadRequest("The request body must be a JSON object.".to_string()))
    }
}
