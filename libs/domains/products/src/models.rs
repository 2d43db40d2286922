use axum_helpers::{FieldReader, FromFields, Unchecked};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::validation::{validate_finite, validate_sortable};

/// A catalogue entry. `(name, brand)` is unique across all products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Widget")]
    pub name: String,
    #[schema(example = "Acme")]
    pub brand: String,
    #[schema(example = 9.99)]
    pub price: f64,
    #[schema(example = 5)]
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /products`.
///
/// Fields are optional at the type level so a missing field surfaces as a
/// "required" rule failure next to the other field errors instead of a
/// deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(
        required(message = "The name field is required."),
        length(max = 255, message = "The name may not be greater than 255 characters.")
    )]
    #[schema(example = "Widget")]
    pub name: Option<String>,
    #[validate(
        required(message = "The brand field is required."),
        length(max = 255, message = "The brand may not be greater than 255 characters.")
    )]
    #[schema(example = "Acme")]
    pub brand: Option<String>,
    #[validate(
        required(message = "The price field is required."),
        range(min = 0.0, message = "The price must be at least 0."),
        custom(function = "validate_finite", message = "The price must be a number.")
    )]
    #[schema(example = 9.99)]
    pub price: Option<f64>,
    #[validate(
        required(message = "The stock field is required."),
        range(min = 0, message = "The stock must be at least 0.")
    )]
    #[schema(example = 5)]
    pub stock: Option<i32>,
}

impl FromFields for CreateProduct {
    fn from_fields(fields: &mut FieldReader) -> Self {
        Self {
            name: fields.read("name", "The name must be a string."),
            brand: fields.read("brand", "The brand must be a string."),
            price: fields.read("price", "The price must be a number."),
            stock: fields.read("stock", "The stock must be an integer."),
        }
    }
}

/// A create request that has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub stock: i32,
}

impl TryFrom<Unchecked<CreateProduct>> for NewProduct {
    type Error = ValidationErrors;

    fn try_from(input: Unchecked<CreateProduct>) -> Result<Self, Self::Error> {
        let input = input.validate()?;

        // `required` rules guarantee every field is present past this point.
        match (input.name, input.brand, input.price, input.stock) {
            (Some(name), Some(brand), Some(price), Some(stock)) => Ok(Self {
                name,
                brand,
                price,
                stock,
            }),
            _ => Err(ValidationErrors::new()),
        }
    }
}

/// Request body for `PUT`/`PATCH /products/{id}`. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "The brand may not be greater than 255 characters."))]
    pub brand: Option<String>,
    #[validate(
        range(min = 0.0, message = "The price must be at least 0."),
        custom(function = "validate_finite", message = "The price must be a number.")
    )]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "The stock must be at least 0."))]
    pub stock: Option<i32>,
}

impl FromFields for UpdateProduct {
    fn from_fields(fields: &mut FieldReader) -> Self {
        Self {
            name: fields.read("name", "The name must be a string."),
            brand: fields.read("brand", "The brand must be a string."),
            price: fields.read("price", "The price must be a number."),
            stock: fields.read("stock", "The stock must be an integer."),
        }
    }
}

/// Query parameters accepted by `GET /products`.
///
/// `page` is deliberately a string: a malformed page number falls back to the
/// first page rather than failing the request.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Exact, case-sensitive name match
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,
    /// Exact, case-sensitive brand match
    #[validate(length(max = 255, message = "The brand may not be greater than 255 characters."))]
    pub brand: Option<String>,
    #[validate(
        range(min = 0.0, message = "The from price must be at least 0."),
        custom(function = "validate_finite", message = "The from price must be a number.")
    )]
    pub from_price: Option<f64>,
    #[validate(
        range(min = 0.0, message = "The to price must be at least 0."),
        custom(function = "validate_finite", message = "The to price must be a number.")
    )]
    pub to_price: Option<f64>,
    #[validate(range(min = 0, message = "The from stock must be at least 0."))]
    pub from_stock: Option<i32>,
    #[validate(range(min = 0, message = "The to stock must be at least 0."))]
    pub to_stock: Option<i32>,
    /// `name`, `brand`, `price` or `stock`, prefixed with `-` for descending
    #[validate(custom(function = "validate_sortable"))]
    pub sort: Option<String>,
    /// Between 1 and 100, default 20
    #[validate(range(min = 1, max = 100, message = "The per page must be between 1 and 100."))]
    pub per_page: Option<i64>,
    pub page: Option<String>,
}

impl FromFields for ProductFilter {
    fn from_fields(fields: &mut FieldReader) -> Self {
        Self {
            name: fields.read("name", "The name must be a string."),
            brand: fields.read("brand", "The brand must be a string."),
            from_price: fields.read("fromPrice", "The from price must be a number."),
            to_price: fields.read("toPrice", "The to price must be a number."),
            from_stock: fields.read("fromStock", "The from stock must be an integer."),
            to_stock: fields.read("toStock", "The to stock must be an integer."),
            sort: fields.read("sort", "The sort must be a string."),
            per_page: fields.read("perPage", "The per page must be an integer."),
            page: fields.read("page", "The page must be a string."),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, current_page: u64, per_page: u64) -> Self {
        let last_page = total.div_ceil(per_page.max(1)).max(1);
        Self {
            items,
            total,
            current_page,
            per_page,
            last_page,
        }
    }
}

/// Body of create and update responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductMessage {
    #[schema(example = "Product created.")]
    pub message: String,
    pub product: Product,
}

impl ProductMessage {
    pub fn new(message: impl Into<String>, product: Product) -> Self {
        Self {
            message: message.into(),
            product,
        }
    }
}

/// Body of delete responses, carrying the last known state of the product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProductMessage {
    #[schema(example = "Product deleted.")]
    pub message: String,
    pub deleted_product: Product,
}

impl Product {
    /// Build a product for a storage-assigned id.
    pub fn new(id: i32, input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: input.name,
            brand: input.brand,
            price: input.price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields present in `update` and bump `updated_at`.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> CreateProduct {
        CreateProduct {
            name: Some("Widget".to_string()),
            brand: Some("Acme".to_string()),
            price: Some(9.99),
            stock: Some(5),
        }
    }

    #[test]
    fn test_valid_create_becomes_new_product() {
        let new = NewProduct::try_from(Unchecked::from(widget())).unwrap();
        assert_eq!(new.name, "Widget");
        assert_eq!(new.stock, 5);
    }

    #[test]
    fn test_create_requires_every_field() {
        let errors = NewProduct::try_from(Unchecked::from(CreateProduct::default())).unwrap_err();
        let fields = errors.field_errors();

        for field in ["name", "brand", "price", "stock"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
        assert_eq!(
            fields["name"][0].message.as_deref(),
            Some("The name field is required.")
        );
    }

    #[test]
    fn test_create_rejects_negative_and_oversized_values() {
        let input = CreateProduct {
            name: Some("x".repeat(256)),
            price: Some(-0.01),
            stock: Some(-1),
            ..widget()
        };

        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
        assert!(!fields.contains_key("brand"));
    }

    #[test]
    fn test_update_accepts_empty_body() {
        assert!(UpdateProduct::default().validate().is_ok());
    }

    #[test]
    fn test_update_checks_supplied_fields() {
        let update = UpdateProduct {
            stock: Some(-3),
            ..Default::default()
        };
        assert!(update.validate().unwrap_err().field_errors().contains_key("stock"));
    }

    #[test]
    fn test_apply_update_merges_present_fields() {
        let mut product = Product::new(1, NewProduct::try_from(Unchecked::from(widget())).unwrap());
        let created_at = product.created_at;

        product.apply_update(UpdateProduct {
            price: Some(12.5),
            ..Default::default()
        });

        assert_eq!(product.name, "Widget");
        assert_eq!(product.brand, "Acme");
        assert_eq!(product.price, 12.5);
        assert_eq!(product.created_at, created_at);
        assert!(product.updated_at >= created_at);
    }

    fn query(pairs: &[(&str, &str)]) -> (ProductFilter, Result<(), ValidationErrors>) {
        let mut fields = FieldReader::from_pairs(
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        );
        let filter = ProductFilter::from_fields(&mut fields);
        let result = fields.finish(&filter);
        (filter, result)
    }

    #[test]
    fn test_filter_reads_camel_case_keys() {
        let (filter, result) = query(&[("fromPrice", "1.5"), ("toStock", "10"), ("perPage", "5")]);

        assert!(result.is_ok());
        assert_eq!(filter.from_price, Some(1.5));
        assert_eq!(filter.to_stock, Some(10));
        assert_eq!(filter.per_page, Some(5));
    }

    #[test]
    fn test_filter_errors_use_query_keys() {
        let (_, result) = query(&[("fromStock", "abc"), ("toPrice", "NaN"), ("perPage", "0")]);
        let errors = result.unwrap_err();
        let fields = errors.field_errors();

        assert_eq!(
            fields["fromStock"][0].message.as_deref(),
            Some("The from stock must be an integer.")
        );
        assert_eq!(
            fields["toPrice"][0].message.as_deref(),
            Some("The to price must be a number.")
        );
        assert_eq!(
            fields["perPage"][0].message.as_deref(),
            Some("The per page must be between 1 and 100.")
        );
    }

    #[test]
    fn test_create_reports_wrong_types_instead_of_required() {
        let input = Unchecked::<CreateProduct>::from_json(serde_json::json!({
            "name": ["Widget"],
            "brand": "Acme",
            "price": "9.99",
            "stock": 2.5
        }))
        .unwrap();

        let errors = NewProduct::try_from(input).unwrap_err();
        let fields = errors.field_errors();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["name"][0].message.as_deref(), Some("The name must be a string."));
        assert_eq!(fields["stock"][0].message.as_deref(), Some("The stock must be an integer."));
    }

    #[test]
    fn test_non_finite_price_is_rejected() {
        let input = CreateProduct {
            price: Some(f64::INFINITY),
            ..widget()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(
            errors.field_errors()["price"][0].message.as_deref(),
            Some("The price must be a number.")
        );
    }

    #[test]
    fn test_filter_bounds_per_page() {
        for per_page in [0, -1, 101] {
            let filter = ProductFilter {
                per_page: Some(per_page),
                ..Default::default()
            };
            assert!(filter.validate().is_err(), "per_page={}", per_page);
        }
    }

    #[test]
    fn test_last_page() {
        assert_eq!(Paginated::<()>::new(vec![], 0, 1, 20).last_page, 1);
        assert_eq!(Paginated::<()>::new(vec![], 20, 1, 20).last_page, 1);
        assert_eq!(Paginated::<()>::new(vec![], 21, 1, 20).last_page, 2);
    }

    #[test]
    fn test_deleted_message_key() {
        let product = Product::new(3, NewProduct::try_from(Unchecked::from(widget())).unwrap());
        let body = serde_json::to_value(DeletedProductMessage {
            message: "Product deleted.".to_string(),
            deleted_product: product,
        })
        .unwrap();

        assert_eq!(body["deletedProduct"]["id"], 3);
    }
}
