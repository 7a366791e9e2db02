use async_trait::async_trait;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{Put, ReturnValue, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;

use super::{Expression, ItemUpdate, MarketplaceStore, Query, TransactWrite};
use crate::config::Config;
use crate::debug_log;
use crate::dynamodb::init_dynamodb_client;
use crate::dynamodb::maps_mk2::AttributeValueHashMap;
use crate::error::ApiError;

/// The cancellation reason DynamoDB reports for a failed condition inside a
/// transaction.
const TRANSACTION_CONDITION_FAILED: &str = "ConditionalCheckFailed";

/// The marketplace table in DynamoDB.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: Client, config: &Config) -> Self {
        Self { client, table_name: config.table_name.clone() }
    }

    /// Builds the client from the environment's AWS settings.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(init_dynamodb_client().await, config)
    }

    fn transact_write_item(&self, write: TransactWrite) -> Result<TransactWriteItem, ApiError> {
        let item = match write {
            TransactWrite::Update { key, update } => {
                let mut expr = Expression::default();
                let update_expression = expr.update(&update.actions);
                let condition = update.condition.as_ref().map(|c| expr.condition(c));
                let (names, values) = expr.into_parts();
                TransactWriteItem::builder()
                    .update(
                        Update::builder()
                            .table_name(&self.table_name)
                            .set_key(Some(key))
                            .update_expression(update_expression)
                            .set_condition_expression(condition)
                            .set_expression_attribute_names(names)
                            .set_expression_attribute_values(values)
                            .build()?
                    ).build()
            }
            TransactWrite::Put { item, condition } => {
                let mut expr = Expression::default();
                let condition = condition.as_ref().map(|c| expr.condition(c));
                let (names, values) = expr.into_parts();
                TransactWriteItem::builder()
                    .put(
                        Put::builder()
                            .table_name(&self.table_name)
                            .set_item(Some(item))
                            .set_condition_expression(condition)
                            .set_expression_attribute_names(names)
                            .set_expression_attribute_values(values)
                            .build()?
                    ).build()
            }
        };
        Ok(item)
    }
}

#[async_trait]
impl MarketplaceStore for DynamoStore {
    async fn get_item(&self, key: AttributeValueHashMap) -> Result<Option<AttributeValueHashMap>, ApiError> {
        let get_output = self.client.get_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .consistent_read(false)
            .send()
            .await?;
        Ok(get_output.item)
    }

    async fn put_item(&self, item: AttributeValueHashMap) -> Result<(), ApiError> {
        self.client.put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;
        Ok(())
    }

    async fn update_item(&self, key: AttributeValueHashMap, update: ItemUpdate) -> Result<AttributeValueHashMap, ApiError> {
        let mut expr = Expression::default();
        let update_expression = expr.update(&update.actions);
        let condition = update.condition.as_ref().map(|c| expr.condition(c));
        let (names, values) = expr.into_parts();
        debug_log!("Updating item: {} (condition: {:?})", update_expression, condition);

        let update_output = self.client.update_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .update_expression(update_expression)
            .set_condition_expression(condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;
        Ok(update_output.attributes.unwrap_or_default())
    }

    async fn delete_item(&self, key: AttributeValueHashMap) -> Result<(), ApiError> {
        self.client.delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key))
            .send()
            .await?;
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<AttributeValueHashMap>, ApiError> {
        let mut expr = Expression::default();
        let key_condition = expr.key_condition(&query);
        let (names, values) = expr.into_parts();
        debug_log!("Querying {:?}: {}", query.index.map(|i| i.name), key_condition);

        let items = self.client.query()
            .table_name(&self.table_name)
            .set_index_name(query.index.map(|i| i.name.to_string()))
            .key_condition_expression(key_condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;
        Ok(items)
    }

    async fn scan(&self) -> Result<Vec<AttributeValueHashMap>, ApiError> {
        let items = self.client.scan()
            .table_name(&self.table_name)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;
        Ok(items)
    }

    async fn transact_write(&self, writes: Vec<TransactWrite>) -> Result<(), ApiError> {
        let items = writes.into_iter()
            .map(|w| self.transact_write_item(w))
            .collect::<Result<Vec<_>, _>>()?;

        let result = self.client.transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(TransactWriteItemsError::TransactionCanceledException(cancelled)) = err.as_service_error() {
                    let condition_failed = cancelled.cancellation_reasons()
                        .iter()
                        .any(|r| r.code() == Some(TRANSACTION_CONDITION_FAILED));
                    if condition_failed {
                        return Err(ApiError::ConditionFailed);
                    }
                }
                Err(err.into())
            }
        }
    }
}
