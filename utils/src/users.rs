//! Reads that span every entity kind.

use crate::dynamodb::{item_to_json, items_to_json};
use crate::error::ApiError;
use crate::request::OperationInput;
use crate::response::ApiResponse;
use crate::store::{MarketplaceStore, Query, SortCondition};
use crate::tables::marketplace::{BY_COGNITO_ID, METADATA_PREFIX};

/// `GET /items`: every item in the table.
pub async fn get_all_items<S: MarketplaceStore + ?Sized>(store: &S, _input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let items = store.scan().await?;
    if items.is_empty() {
        return Err(ApiError::NotFound("Items".into()));
    }
    Ok(ApiResponse::ok(items_to_json(items)?))
}

/// `GET /users/{cognitoId}`
///
/// Resolves an external identity to the client or seller registered with it.
/// Only metadata items are considered; when more than one matches, the first
/// in sort key order is returned.
pub async fn get_user_by_cognito_id<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let cognito_id = input.path_parameter("cognitoId")?;
    let query = Query::index(BY_COGNITO_ID, cognito_id.to_string(), SortCondition::BeginsWith(METADATA_PREFIX.into()));
    match store.query(query).await?.into_iter().next() {
        Some(user) => Ok(ApiResponse::ok(item_to_json(user)?)),
        None => Err(ApiError::NotFound("User".into()))
    }
}
