//! Turns a [`ProductFilter`] into a storage-agnostic [`ProductQuery`].
//!
//! Only the parameters `ProductFilter` declares can become predicates, each
//! mapped to a fixed column. Repositories translate the predicates into their
//! own query language (`PgProductRepository`) or evaluate them directly
//! (`InMemoryProductRepository`).

use validator::{Validate, ValidationErrors};

use crate::models::{Product, ProductFilter};
use crate::validation::SortSpec;

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Highest page whose offset still fits a Postgres `bigint`.
fn last_addressable_page(per_page: u64) -> u64 {
    i64::MAX as u64 / per_page.max(1)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    NameEquals(String),
    BrandEquals(String),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    StockAtLeast(i32),
    StockAtMost(i32),
}

impl Predicate {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Predicate::NameEquals(name) => product.name == *name,
            Predicate::BrandEquals(brand) => product.brand == *brand,
            Predicate::PriceAtLeast(min) => product.price >= *min,
            Predicate::PriceAtMost(max) => product.price <= *max,
            Predicate::StockAtLeast(min) => product.stock >= *min,
            Predicate::StockAtMost(max) => product.stock <= *max,
        }
    }
}

/// Criteria for one page of products. All predicates must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub predicates: Vec<Predicate>,
    pub sort: Option<SortSpec>,
    /// 1-based, at most the last page whose offset fits an `i64`
    pub page: u64,
    pub per_page: u64,
}

impl ProductQuery {
    /// Every product, in storage order.
    pub fn unfiltered(page: u64) -> Self {
        Self {
            predicates: Vec::new(),
            sort: None,
            page: page.clamp(1, last_addressable_page(DEFAULT_PER_PAGE)),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn builder(page: u64) -> ProductQueryBuilder {
        ProductQueryBuilder {
            query: Self::unfiltered(page),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty() && self.sort.is_none() && self.per_page == DEFAULT_PER_PAGE
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.predicates.iter().all(|p| p.matches(product))
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct ProductQueryBuilder {
    query: ProductQuery,
}

impl ProductQueryBuilder {
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.query.predicates.push(predicate);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.query.sort = Some(sort);
        self
    }

    pub fn per_page(mut self, per_page: u64) -> Self {
        self.query.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn build(mut self) -> ProductQuery {
        let last = last_addressable_page(self.query.per_page);
        self.query.page = self.query.page.min(last);
        self.query
    }
}

impl ProductFilter {
    /// True when any parameter other than `page` was supplied.
    pub fn has_criteria(&self) -> bool {
        self.name.is_some()
            || self.brand.is_some()
            || self.from_price.is_some()
            || self.to_price.is_some()
            || self.from_stock.is_some()
            || self.to_stock.is_some()
            || self.sort.is_some()
            || self.per_page.is_some()
    }

    /// Requested page, falling back to 1 when absent, malformed or zero.
    pub fn page_number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

/// Validate `filter` and build the matching query.
///
/// A filter with no criteria skips validation entirely and yields
/// [`ProductQuery::unfiltered`].
pub fn build_query(filter: &ProductFilter) -> Result<ProductQuery, ValidationErrors> {
    let page = filter.page_number();
    if !filter.has_criteria() {
        return Ok(ProductQuery::unfiltered(page));
    }

    filter.validate()?;

    let mut builder = ProductQuery::builder(page);

    if let Some(name) = &filter.name {
        builder = builder.predicate(Predicate::NameEquals(name.clone()));
    }
    if let Some(brand) = &filter.brand {
        builder = builder.predicate(Predicate::BrandEquals(brand.clone()));
    }
    if let Some(min) = filter.from_price {
        builder = builder.predicate(Predicate::PriceAtLeast(min));
    }
    if let Some(max) = filter.to_price {
        builder = builder.predicate(Predicate::PriceAtMost(max));
    }
    if let Some(min) = filter.from_stock {
        builder = builder.predicate(Predicate::StockAtLeast(min));
    }
    if let Some(max) = filter.to_stock {
        builder = builder.predicate(Predicate::StockAtMost(max));
    }
    if let Some(sort) = &filter.sort {
        let spec = sort.parse::<SortSpec>().map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("sort", e);
            errors
        })?;
        builder = builder.sort(spec);
    }
    if let Some(per_page) = filter.per_page.and_then(|n| u64::try_from(n).ok()) {
        builder = builder.per_page(per_page);
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProduct;
    use crate::validation::{SortColumn, SortDirection};

    fn product(name: &str, brand: &str, price: f64, stock: i32) -> Product {
        Product::new(
            1,
            NewProduct {
                name: name.to_string(),
                brand: brand.to_string(),
                price,
                stock,
            },
        )
    }

    #[test]
    fn test_empty_filter_takes_fast_path() {
        let query = build_query(&ProductFilter::default()).unwrap();

        assert!(query.is_unfiltered());
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_page_alone_is_not_a_criterion() {
        let filter = ProductFilter {
            page: Some("3".to_string()),
            ..Default::default()
        };

        assert!(!filter.has_criteria());
        let query = build_query(&filter).unwrap();
        assert!(query.is_unfiltered());
        assert_eq!(query.page, 3);
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn test_malformed_page_falls_back_to_first() {
        for raw in ["abc", "0", "-2", ""] {
            let filter = ProductFilter {
                page: Some(raw.to_string()),
                ..Default::default()
            };
            assert_eq!(filter.page_number(), 1, "page={:?}", raw);
        }
    }

    #[test]
    fn test_builds_predicates_for_present_params_only() {
        let filter = ProductFilter {
            brand: Some("Acme".to_string()),
            from_price: Some(5.0),
            to_stock: Some(10),
            sort: Some("-price".to_string()),
            per_page: Some(5),
            ..Default::default()
        };

        let query = build_query(&filter).unwrap();

        assert_eq!(
            query.predicates,
            vec![
                Predicate::BrandEquals("Acme".to_string()),
                Predicate::PriceAtLeast(5.0),
                Predicate::StockAtMost(10),
            ]
        );
        assert_eq!(
            query.sort,
            Some(SortSpec::new(SortColumn::Price, SortDirection::Desc))
        );
        assert_eq!(query.per_page, 5);
    }

    #[test]
    fn test_huge_page_is_clamped_to_addressable_offset() {
        for per_page in [None, Some(1), Some(7), Some(100)] {
            let filter = ProductFilter {
                page: Some("1000000000000000000000".to_string()),
                per_page,
                ..Default::default()
            };
            // Past u64 the page is malformed and falls back to 1
            assert_eq!(build_query(&filter).unwrap().page, 1);

            let filter = ProductFilter {
                page: Some(u64::MAX.to_string()),
                per_page,
                ..Default::default()
            };
            let query = build_query(&filter).unwrap();
            assert!(query.page > 1);
            let offset = (query.page - 1).checked_mul(query.per_page).unwrap();
            assert!(offset <= i64::MAX as u64, "per_page={:?}", per_page);
        }
    }

    #[test]
    fn test_per_page_above_limit_is_rejected() {
        let filter = ProductFilter {
            per_page: Some(101),
            ..Default::default()
        };
        let errors = build_query(&filter).unwrap_err();
        assert!(errors.field_errors().contains_key("per_page"));

        let filter = ProductFilter {
            per_page: Some(i64::MAX),
            ..Default::default()
        };
        assert!(build_query(&filter).is_err());
    }

    #[test]
    fn test_non_finite_price_bounds_are_rejected() {
        for value in [f64::NAN, f64::INFINITY] {
            let filter = ProductFilter {
                to_price: Some(value),
                ..Default::default()
            };
            let errors = build_query(&filter).unwrap_err();
            assert!(errors.field_errors().contains_key("to_price"));
        }
    }

    #[test]
    fn test_invalid_sort_fails_on_sort_field() {
        let filter = ProductFilter {
            sort: Some("id".to_string()),
            ..Default::default()
        };

        let errors = build_query(&filter).unwrap_err();
        assert!(errors.field_errors().contains_key("sort"));
    }

    #[test]
    fn test_negative_price_bound_is_rejected() {
        let filter = ProductFilter {
            from_price: Some(-1.0),
            ..Default::default()
        };
        assert!(build_query(&filter).is_err());
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let query = ProductQuery::builder(1)
            .predicate(Predicate::PriceAtLeast(10.0))
            .predicate(Predicate::PriceAtMost(10.0))
            .predicate(Predicate::StockAtLeast(3))
            .predicate(Predicate::StockAtMost(3))
            .build();

        assert!(query.matches(&product("Widget", "Acme", 10.0, 3)));
        assert!(!query.matches(&product("Widget", "Acme", 10.01, 3)));
        assert!(!query.matches(&product("Widget", "Acme", 10.0, 4)));
    }

    #[test]
    fn test_name_match_is_exact_and_case_sensitive() {
        let query = ProductQuery::builder(1)
            .predicate(Predicate::NameEquals("Widget".to_string()))
            .build();

        assert!(query.matches(&product("Widget", "Acme", 1.0, 1)));
        assert!(!query.matches(&product("widget", "Acme", 1.0, 1)));
        assert!(!query.matches(&product("Widget Pro", "Acme", 1.0, 1)));
    }
}
