use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::filters::ProductQuery;
use crate::models::{NewProduct, Paginated, Product};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and return it with its assigned id
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// One page of products matching `query`
    async fn list(&self, query: ProductQuery) -> ProductResult<Paginated<Product>>;

    /// Persist a merged product. Fails with `NotFound` if it no longer exists.
    async fn update(&self, product: Product) -> ProductResult<Product>;

    /// Returns whether a product was removed
    async fn delete(&self, id: i32) -> ProductResult<bool>;

    /// Count products with exactly this name and brand, ignoring `exclude_id`
    async fn count_by_name_and_brand(
        &self,
        name: &str,
        brand: &str,
        exclude_id: Option<i32>,
    ) -> ProductResult<u64>;
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i32, Product>,
    last_id: i32,
}

impl Store {
    fn name_and_brand_taken(&self, name: &str, brand: &str, exclude_id: Option<i32>) -> bool {
        self.products
            .values()
            .any(|p| Some(p.id) != exclude_id && p.name == name && p.brand == brand)
    }
}

/// In-memory implementation of ProductRepository (for development/testing).
///
/// Enforces the `(name, brand)` uniqueness the Postgres unique index provides.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if store.name_and_brand_taken(&input.name, &input.brand, None) {
            return Err(ProductError::DuplicateNameAndBrand);
        }

        store.last_id += 1;
        let product = Product::new(store.last_id, input);
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn list(&self, query: ProductQuery) -> ProductResult<Paginated<Product>> {
        let store = self.store.read().await;

        // BTreeMap iteration keeps id order, which the stable sort preserves for ties
        let mut matched: Vec<Product> = store
            .products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();

        if let Some(sort) = query.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect();

        Ok(Paginated::new(items, total, query.page, query.per_page))
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        if !store.products.contains_key(&product.id) {
            return Err(ProductError::NotFound(product.id));
        }
        if store.name_and_brand_taken(&product.name, &product.brand, Some(product.id)) {
            return Err(ProductError::DuplicateNameAndBrand);
        }

        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut store = self.store.write().await;

        if store.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_by_name_and_brand(
        &self,
        name: &str,
        brand: &str,
        exclude_id: Option<i32>,
    ) -> ProductResult<u64> {
        let store = self.store.read().await;
        let count = store
            .products
            .values()
            .filter(|p| Some(p.id) != exclude_id && p.name == name && p.brand == brand)
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Predicate;
    use crate::validation::{SortColumn, SortDirection, SortSpec};

    fn new_product(name: &str, brand: &str, price: f64, stock: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            brand: brand.to_string(),
            price,
            stock,
        }
    }

    async fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("Widget", "Acme", 9.99, 5)).await.unwrap();
        repo.create(new_product("Gadget", "Acme", 24.5, 0)).await.unwrap();
        repo.create(new_product("Widget", "Globex", 7.25, 12)).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = seeded().await;

        let fetched = repo.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Gadget");
        assert!(repo.get_by_id(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_and_brand_rejected() {
        let repo = seeded().await;

        let result = repo.create(new_product("Widget", "Acme", 1.0, 1)).await;
        assert!(matches!(result, Err(ProductError::DuplicateNameAndBrand)));
    }

    #[tokio::test]
    async fn test_count_excludes_given_id() {
        let repo = seeded().await;

        assert_eq!(repo.count_by_name_and_brand("Widget", "Acme", None).await.unwrap(), 1);
        assert_eq!(repo.count_by_name_and_brand("Widget", "Acme", Some(1)).await.unwrap(), 0);
        assert_eq!(repo.count_by_name_and_brand("widget", "Acme", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_paginates() {
        let repo = seeded().await;

        let query = ProductQuery::builder(1)
            .predicate(Predicate::NameEquals("Widget".to_string()))
            .sort(SortSpec::new(SortColumn::Price, SortDirection::Asc))
            .per_page(1)
            .build();

        let page = repo.list(query.clone()).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.items[0].brand, "Globex");

        let second = repo.list(ProductQuery { page: 2, ..query }).await.unwrap();
        assert_eq!(second.items[0].brand, "Acme");
        assert_eq!(second.current_page, 2);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = InMemoryProductRepository::new();
        let ghost = Product::new(42, new_product("Ghost", "None", 1.0, 1));

        let result = repo.update(ghost).await;
        assert!(matches!(result, Err(ProductError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = seeded().await;

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
        assert!(repo.get_by_id(1).await.unwrap().is_none());
    }
}
