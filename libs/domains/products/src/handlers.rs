use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, IdPath, Unchecked, ValidatedQuery,
    errors::responses::{
        BadRequestPathResponse, InternalServerErrorResponse, NotFoundResponse,
        ValidationErrorResponse,
    },
};
use core_config::audit::AuditConfig;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::context::RequestContext;
use crate::error::ProductResult;
use crate::models::{
    CreateProduct, DeletedProductMessage, Paginated, Product, ProductFilter, ProductMessage,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "Products";

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, ProductMessage, DeletedProductMessage),
        responses(
            ValidationErrorResponse,
            BadRequestPathResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalogue endpoints")
    )
)]
pub struct ApiDoc;

/// Router state: the service plus the audit switch read at startup.
pub struct ProductsState<R: ProductRepository> {
    pub service: Arc<ProductService<R>>,
    pub audit: AuditConfig,
}

impl<R: ProductRepository> ProductsState<R> {
    pub fn new(service: ProductService<R>, audit: AuditConfig) -> Self {
        Self {
            service: Arc::new(service),
            audit,
        }
    }
}

impl<R: ProductRepository> Clone for ProductsState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            audit: self.audit,
        }
    }
}

/// Create the product router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    audit: AuditConfig,
) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .with_state(ProductsState::new(service, audit))
}

/// List products, optionally filtered, sorted and paginated
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductFilter),
    responses(
        (status = 200, description = "One page of products", body = Paginated<Product>),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    ValidatedQuery(filter): ValidatedQuery<ProductFilter>,
) -> ProductResult<Json<Paginated<Product>>> {
    let page = state.service.list_products(&filter).await?;
    Ok(Json(page))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductMessage),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    ctx: RequestContext,
    input: Unchecked<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = state.service.create_product(&ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductMessage::new("Product created.", product)),
    ))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestPathResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<Product>> {
    let product = state.service.get_product(id).await?;
    Ok(Json(product))
}

/// Update some or all fields of a product
///
/// The product is looked up before the body is judged, so an unknown id is a
/// 404 even when the body is not valid JSON.
#[utoipa::path(
    method(put, patch),
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductMessage),
        (status = 400, response = BadRequestPathResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    ctx: RequestContext,
    IdPath(id): IdPath,
    payload: Result<Unchecked<UpdateProduct>, AppError>,
) -> Result<Json<ProductMessage>, AppError> {
    let input = match payload {
        Ok(input) => input,
        Err(rejection) => {
            state.service.get_product(id).await?;
            return Err(rejection);
        }
    };
    let product = state.service.update_product(&ctx, id, input).await?;
    Ok(Json(ProductMessage::new("Product updated.", product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = DeletedProductMessage),
        (status = 400, response = BadRequestPathResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(state): State<ProductsState<R>>,
    ctx: RequestContext,
    IdPath(id): IdPath,
) -> ProductResult<Json<DeletedProductMessage>> {
    let product = state.service.delete_product(&ctx, id).await?;
    Ok(Json(DeletedProductMessage {
        message: "Product deleted.".to_string(),
        deleted_product: product,
    }))
}
