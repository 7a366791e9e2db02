//! Seller operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dynamodb::{item_to_json, items_to_json, patch_fields, to_item};
use crate::error::ApiError;
use crate::request::OperationInput;
use crate::response::ApiResponse;
use crate::store::{get_existing, update_existing, MarketplaceStore, Query, SortCondition};
use crate::tables::marketplace::{metadata_sk, seller_key, seller_pk, EntityType, BY_TYPE, SELLER_PREFIX};

const ENTITY: &str = "Seller";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSeller {
    pub seller_name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub cognito_id: Option<String>,
}

/// A seller's metadata item. Everything but the keys is optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub seller_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognito_id: Option<String>,
}

impl Seller {
    pub fn new(seller_id: String, request: NewSeller) -> Self {
        Self {
            pk: seller_pk(&seller_id),
            sk: metadata_sk(&seller_id),
            entity_type: EntityType::Seller.as_str().into(),
            seller_id,
            seller_name: request.seller_name,
            description: request.description,
            phone: request.phone,
            category: request.category,
            cognito_id: request.cognito_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// `POST /sellers`
pub async fn create_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let request: NewSeller = input.payload()?;
    let seller = Seller::new(Uuid::new_v4().to_string(), request);
    store.put_item(to_item(&seller)?).await?;
    Ok(ApiResponse::created(serde_json::to_value(&seller)?))
}

/// `GET /sellers`, through the by-type index.
pub async fn get_all_sellers<S: MarketplaceStore + ?Sized>(store: &S, _input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let query = Query::index(
        BY_TYPE,
        EntityType::Seller.as_str().into(),
        SortCondition::BeginsWith(SELLER_PREFIX.into()),
    );
    let sellers = store.query(query).await?;
    if sellers.is_empty() {
        return Err(ApiError::NotFound("Sellers".into()));
    }
    Ok(ApiResponse::ok(items_to_json(sellers)?))
}

/// `GET /sellers/{PK}`
pub async fn get_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let item = get_existing(store, seller_key(seller_id), ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(item)?))
}

/// `PUT /sellers/{PK}`
pub async fn update_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let patch: SellerPatch = input.payload()?;
    let attributes = update_existing(store, seller_key(seller_id), patch_fields(&patch)?, ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(attributes)?))
}

/// `DELETE /sellers/{PK}`
pub async fn delete_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    store.delete_item(seller_key(seller_id)).await?;
    Ok(ApiResponse::message("The seller was deleted"))
}
