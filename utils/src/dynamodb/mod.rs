pub mod maps_mk2;

use aws_config::meta::region::RegionProviderChain;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use maps_mk2::AttributeValueHashMap;

/// Builds a DynamoDB client from the environment, defaulting to `us-east-1`.
pub async fn init_dynamodb_client() -> Client {
    let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
    let aws_config = aws_config::from_env().region(region_provider).load().await;
    Client::new(&aws_config)
}

/// Converts a DynamoDB item into the JSON object returned to callers.
pub fn item_to_json(item: AttributeValueHashMap) -> Result<Value, ApiError> {
    Ok(serde_dynamo::from_item(item)?)
}

pub fn items_to_json(items: Vec<AttributeValueHashMap>) -> Result<Value, ApiError> {
    let items = items.into_iter()
        .map(item_to_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(items))
}

/// Converts an entity into the item written to the table.
pub fn to_item<T: Serialize>(entity: &T) -> Result<AttributeValueHashMap, ApiError> {
    Ok(serde_dynamo::to_item(entity)?)
}

/// Converts a JSON scalar into an attribute value.
pub fn to_attribute_value(value: &Value) -> Result<AttributeValue, ApiError> {
    Ok(serde_dynamo::to_attribute_value(value)?)
}

/// Turns a patch struct into `(attribute, value)` pairs, sorted by name.
///
/// Fields the patch skips when serializing are not part of the update.
pub fn patch_fields<T: Serialize>(patch: &T) -> Result<Vec<(String, AttributeValue)>, ApiError> {
    let mut fields = to_item(patch)?.into_iter().collect::<Vec<_>>();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(fields)
}
