//! Extractors that turn request parts into typed values and reject with
//! [`crate::AppError`] so every failure shares one body shape.

pub mod fields;
pub mod id_path;
pub mod identity;
pub mod unchecked_json;
pub mod validated_query;

pub use fields::{FieldReader, FromFields};
pub use id_path::IdPath;
pub use identity::{RequestIdentity, USER_ID_HEADER};
pub use unchecked_json::Unchecked;
pub use validated_query::ValidatedQuery;
