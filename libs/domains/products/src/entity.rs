use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{NewProduct, Product};

/// Sea-ORM entity for the `products` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            brand: model.brand,
            price: model.price,
            stock: model.stock,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        let now = Utc::now();

        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            brand: Set(input.brand),
            price: Set(input.price),
            stock: Set(input.stock),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}

// Full overwrite of a merged product; `created_at` is left untouched.
impl From<Product> for ActiveModel {
    fn from(product: Product) -> Self {
        ActiveModel {
            id: Set(product.id),
            name: Set(product.name),
            brand: Set(product.brand),
            price: Set(product.price),
            stock: Set(product.stock),
            created_at: NotSet,
            updated_at: Set(product.updated_at.into()),
        }
    }
}
