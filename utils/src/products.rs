//! Product operations. Products live in their seller's partition.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dynamodb::{item_to_json, items_to_json, patch_fields, to_item};
use crate::error::ApiError;
use crate::request::OperationInput;
use crate::response::ApiResponse;
use crate::store::{get_existing, update_existing, MarketplaceStore, Query, SortCondition};
use crate::tables::marketplace::{product_key, product_sk, seller_pk, EntityType, BY_TYPE, PRODUCT_PREFIX, SELLER_PREFIX};
use crate::{debug_log, OptionHandler};

const ENTITY: &str = "Product";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub measure_unit: Option<String>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub seller_id: String,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_unit: Option<String>,
    pub stock: i64,
}

impl Product {
    /// Price and stock are required because orders are priced and checked
    /// against them. Neither may be negative.
    pub fn new(seller_id: &str, product_id: String, request: NewProduct) -> Result<Self, ApiError> {
        let price = *request.price.should_exist_in_request("price")?;
        let stock = *request.stock.should_exist_in_request("stock")?;
        check_price_and_stock(Some(price), Some(stock))?;
        Ok(Self {
            pk: seller_pk(seller_id),
            sk: product_sk(&product_id),
            entity_type: EntityType::Product.as_str().into(),
            seller_id: seller_id.to_string(),
            product_id,
            product_name: request.product_name,
            description: request.description,
            price,
            category: request.category,
            measure_unit: request.measure_unit,
            stock,
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

fn check_price_and_stock(price: Option<f64>, stock: Option<i64>) -> Result<(), ApiError> {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::InvalidRequest("`price` must be a non-negative number".into()));
        }
    }
    if matches!(stock, Some(s) if s < 0) {
        return Err(ApiError::InvalidRequest("`stock` must not be negative".into()));
    }
    Ok(())
}

/// `POST /sellers/{PK}/products`
pub async fn create_product<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let request: NewProduct = input.payload()?;
    let product = Product::new(seller_id, Uuid::new_v4().to_string(), request)?;

    store.put_item(to_item(&product)?).await?;
    debug_log!("Created product {} for seller {}", product.product_id, seller_id);

    Ok(ApiResponse::created(serde_json::to_value(&product)?))
}

/// `GET /sellers/{PK}/products/{prodPK}`
pub async fn get_product<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let product_id = input.path_parameter("prodPK")?;
    let item = get_existing(store, product_key(seller_id, product_id), ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(item)?))
}

/// `GET /sellers/{PK}/products`. A seller without products gets an empty
/// list.
pub async fn get_products<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let query = Query::table(seller_pk(seller_id), SortCondition::BeginsWith(PRODUCT_PREFIX.into()));
    let products = store.query(query).await?;
    Ok(ApiResponse::ok(items_to_json(products)?))
}

/// `GET /products`
pub async fn get_all_products<S: MarketplaceStore + ?Sized>(store: &S, _input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let query = Query::index(
        BY_TYPE,
        EntityType::Product.as_str().into(),
        SortCondition::BeginsWith(SELLER_PREFIX.into()),
    );
    let products = store.query(query).await?;
    if products.is_empty() {
        return Err(ApiError::NotFound("Products".into()));
    }
    Ok(ApiResponse::ok(items_to_json(products)?))
}

/// `PUT /sellers/{PK}/products/{prodPK}`
pub async fn update_product<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let product_id = input.path_parameter("prodPK")?;
    let patch: ProductPatch = input.payload()?;
    check_price_and_stock(patch.price, patch.stock)?;

    let attributes = update_existing(store, product_key(seller_id, product_id), patch_fields(&patch)?, ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(attributes)?))
}

/// `DELETE /sellers/{PK}/products/{prodPK}`
pub async fn delete_product<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let product_id = input.path_parameter("prodPK")?;
    store.delete_item(product_key(seller_id, product_id)).await?;
    Ok(ApiResponse::message("The product was deleted"))
}
