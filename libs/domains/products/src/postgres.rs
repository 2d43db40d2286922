use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    filters::{Predicate, ProductQuery},
    models::{NewProduct, Paginated, Product},
    repository::ProductRepository,
    validation::{SortColumn, SortDirection},
};

pub struct PgProductRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

/// The `(name, brand)` unique index backs the service's pre-check; a
/// concurrent writer that slips past it lands here.
fn map_write_error(err: DbErr) -> ProductError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::warn!(%detail, "Unique index rejected product write");
            ProductError::DuplicateNameAndBrand
        }
        _ => ProductError::Database(err),
    }
}

fn condition(predicate: &Predicate) -> Condition {
    use entity::Column;

    let condition = Condition::all();
    match predicate {
        Predicate::NameEquals(name) => condition.add(Column::Name.eq(name.as_str())),
        Predicate::BrandEquals(brand) => condition.add(Column::Brand.eq(brand.as_str())),
        Predicate::PriceAtLeast(min) => condition.add(Column::Price.gte(*min)),
        Predicate::PriceAtMost(max) => condition.add(Column::Price.lte(*max)),
        Predicate::StockAtLeast(min) => condition.add(Column::Stock.gte(*min)),
        Predicate::StockAtMost(max) => condition.add(Column::Stock.lte(*max)),
    }
}

fn column(column: SortColumn) -> entity::Column {
    match column {
        SortColumn::Name => entity::Column::Name,
        SortColumn::Brand => entity::Column::Brand,
        SortColumn::Price => entity::Column::Price,
        SortColumn::Stock => entity::Column::Stock,
    }
}

fn order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = input.into();

        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(map_write_error)?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let model = self.base.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, query: ProductQuery) -> ProductResult<Paginated<Product>> {
        let mut select = entity::Entity::find();

        for predicate in &query.predicates {
            select = select.filter(condition(predicate));
        }
        if let Some(sort) = query.sort {
            select = select.order_by(column(sort.column), order(sort.direction));
        }
        // Stable pages for equal sort keys and for the unsorted listing
        select = select.order_by_asc(entity::Column::Id);

        let paginator = select.paginate(self.base.db(), query.per_page);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        Ok(Paginated::new(
            models.into_iter().map(Into::into).collect(),
            total,
            query.page,
            query.per_page,
        ))
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let id = product.id;
        let active_model: entity::ActiveModel = product.into();

        let model = self
            .base
            .update(active_model)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => ProductError::NotFound(id),
                other => map_write_error(other),
            })?;

        tracing::info!(product_id = id, "Updated product");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let rows = self.base.delete_by_id(id).await?;

        if rows > 0 {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(rows > 0)
    }

    async fn count_by_name_and_brand(
        &self,
        name: &str,
        brand: &str,
        exclude_id: Option<i32>,
    ) -> ProductResult<u64> {
        let mut select = entity::Entity::find()
            .filter(entity::Column::Name.eq(name))
            .filter(entity::Column::Brand.eq(brand));

        if let Some(id) = exclude_id {
            select = select.filter(entity::Column::Id.ne(id));
        }

        Ok(select.count(self.base.db()).await?)
    }
}
