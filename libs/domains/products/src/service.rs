use axum_helpers::{AuditOutcome, Unchecked};
use serde_json::json;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{ProductError, ProductResult};
use crate::filters::build_query;
use crate::models::{CreateProduct, NewProduct, Paginated, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

fn resource(id: i32) -> Option<String> {
    Some(format!("product:{}", id))
}

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List products. A filter without criteria returns the plain first-20
    /// style listing without being validated.
    pub async fn list_products(&self, filter: &ProductFilter) -> ProductResult<Paginated<Product>> {
        let query = build_query(filter)?;
        tracing::debug!(
            unfiltered = query.is_unfiltered(),
            page = query.page,
            per_page = query.per_page,
            "Listing products"
        );
        self.repository.list(query).await
    }

    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Audit the request as received, then validate, check `(name, brand)`
    /// uniqueness and insert.
    pub async fn create_product(
        &self,
        ctx: &RequestContext,
        input: impl Into<Unchecked<CreateProduct>>,
    ) -> ProductResult<Product> {
        let input = input.into();
        ctx.audit(
            "product.create",
            None,
            AuditOutcome::Requested,
            json!({ "request": input.raw() }),
        );

        let result = self.insert(input).await;

        match &result {
            Ok(product) => ctx.audit(
                "product.create",
                resource(product.id),
                AuditOutcome::Success,
                json!({ "after": product }),
            ),
            Err(e) => ctx.audit(
                "product.create",
                None,
                AuditOutcome::Failure,
                json!({ "error": e.to_string() }),
            ),
        }
        result
    }

    async fn insert(&self, input: Unchecked<CreateProduct>) -> ProductResult<Product> {
        let input = NewProduct::try_from(input)?;
        self.ensure_unique(&input.name, &input.brand, None).await?;
        self.repository.create(input).await
    }

    /// Partial update. Uniqueness is checked against the merged name and
    /// brand, excluding the product itself, so re-saving unchanged values
    /// succeeds. An unknown id is reported before the input is validated.
    pub async fn update_product(
        &self,
        ctx: &RequestContext,
        id: i32,
        input: impl Into<Unchecked<UpdateProduct>>,
    ) -> ProductResult<Product> {
        let before = self.get_product(id).await?;
        let input = input.into();

        ctx.audit(
            "product.update",
            resource(id),
            AuditOutcome::Requested,
            json!({ "before": &before, "request": input.raw() }),
        );

        let result = self.merge(before.clone(), input).await;

        match &result {
            Ok(after) => ctx.audit(
                "product.update",
                resource(id),
                AuditOutcome::Success,
                json!({ "before": &before, "after": after }),
            ),
            Err(e) => ctx.audit(
                "product.update",
                resource(id),
                AuditOutcome::Failure,
                json!({ "before": &before, "error": e.to_string() }),
            ),
        }
        result
    }

    async fn merge(&self, mut product: Product, input: Unchecked<UpdateProduct>) -> ProductResult<Product> {
        let input = input.validate()?;

        let name = input.name.as_deref().unwrap_or(&product.name);
        let brand = input.brand.as_deref().unwrap_or(&product.brand);
        self.ensure_unique(name, brand, Some(product.id)).await?;

        product.apply_update(input);
        self.repository.update(product).await
    }

    /// Delete and return the last known state of the product.
    pub async fn delete_product(&self, ctx: &RequestContext, id: i32) -> ProductResult<Product> {
        let before = self.get_product(id).await?;

        ctx.audit(
            "product.delete",
            resource(id),
            AuditOutcome::Requested,
            json!({ "before": &before }),
        );

        let result = match self.repository.delete(id).await {
            Ok(true) => Ok(before.clone()),
            Ok(false) => Err(ProductError::NotFound(id)),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => ctx.audit(
                "product.delete",
                resource(id),
                AuditOutcome::Success,
                json!({ "before": &before, "after": null }),
            ),
            Err(e) => ctx.audit(
                "product.delete",
                resource(id),
                AuditOutcome::Failure,
                json!({ "before": &before, "error": e.to_string() }),
            ),
        }
        result
    }

    async fn ensure_unique(&self, name: &str, brand: &str, exclude_id: Option<i32>) -> ProductResult<()> {
        let count = self
            .repository
            .count_by_name_and_brand(name, brand, exclude_id)
            .await?;

        if count > 0 {
            return Err(ProductError::DuplicateNameAndBrand);
        }
        Ok(())
    }
}
