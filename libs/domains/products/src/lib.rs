//! Products Domain
//!
//! CRUD over catalogue products with validated input, `(name, brand)`
//! uniqueness, filtered listings and an optional audit trail.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, RequestContext extraction
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, uniqueness, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Filters    │  ← ProductFilter → ProductQuery (typed predicates)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product, DTOs, pagination envelope
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::audit::AuditConfig;
//! use domain_products::{
//!     handlers,
//!     repository::InMemoryProductRepository,
//!     service::ProductService,
//! };
//!
//! let repository = InMemoryProductRepository::new();
//! let service = ProductService::new(repository);
//!
//! // Mount under /api/products
//! let router = handlers::router(service, AuditConfig { enabled: true });
//! ```

pub mod context;
pub mod entity;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use context::RequestContext;
pub use error::{DUPLICATE_NAME_AND_BRAND, ProductError, ProductResult};
pub use filters::{DEFAULT_PER_PAGE, MAX_PER_PAGE, Predicate, ProductQuery, build_query};
pub use handlers::{ApiDoc, ProductsState};
pub use models::{
    CreateProduct, DeletedProductMessage, NewProduct, Paginated, Product, ProductFilter,
    ProductMessage, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use validation::{SortColumn, SortDirection, SortSpec, validate_finite, validate_sortable};
