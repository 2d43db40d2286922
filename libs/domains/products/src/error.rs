use std::borrow::Cow;

use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub const DUPLICATE_NAME_AND_BRAND: &str = "Product with specified name and brand already exists.";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i32),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{}", DUPLICATE_NAME_AND_BRAND)]
    DuplicateNameAndBrand,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// The duplicate error reported on both halves of the unique key.
    pub fn duplicate_errors() -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in ["name", "brand"] {
            errors.add(
                field,
                ValidationError::new("unique").with_message(Cow::Borrowed(DUPLICATE_NAME_AND_BRAND)),
            );
        }
        errors
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::Validation(errors) => AppError::Validation(errors),
            ProductError::DuplicateNameAndBrand => {
                AppError::Validation(ProductError::duplicate_errors())
            }
            ProductError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
