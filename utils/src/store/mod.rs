//! The storage seam between operations and DynamoDB.
//!
//! Operations only ever see [`MarketplaceStore`]; [`DynamoStore`] is the
//! implementation the Lambda functions are built with.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::dynamodb::maps_mk2::AttributeValueHashMap;
use crate::error::ApiError;
use crate::tables::marketplace::MARKETPLACE_TABLE;
use crate::tables::Index;

mod dynamo;
#[cfg(test)]
pub(crate) mod memory;

pub use dynamo::DynamoStore;

#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Reads one item by its primary key.
    async fn get_item(&self, key: AttributeValueHashMap) -> Result<Option<AttributeValueHashMap>, ApiError>;
    /// Writes an item, replacing any item with the same key.
    async fn put_item(&self, item: AttributeValueHashMap) -> Result<(), ApiError>;
    /// Applies `update` and returns every attribute of the updated item.
    ///
    /// Returns `ApiError::ConditionFailed` when the update's condition does
    /// not hold; nothing is written in that case.
    async fn update_item(&self, key: AttributeValueHashMap, update: ItemUpdate) -> Result<AttributeValueHashMap, ApiError>;
    async fn delete_item(&self, key: AttributeValueHashMap) -> Result<(), ApiError>;
    /// Reads every page of a query.
    async fn query(&self, query: Query) -> Result<Vec<AttributeValueHashMap>, ApiError>;
    /// Reads every page of a full table scan.
    async fn scan(&self) -> Result<Vec<AttributeValueHashMap>, ApiError>;
    /// Applies all writes or none of them.
    ///
    /// Returns `ApiError::ConditionFailed` when any write's condition does not
    /// hold.
    async fn transact_write(&self, writes: Vec<TransactWrite>) -> Result<(), ApiError>;
}

/// Reads an item, reporting a missing one as `NotFound(entity)`.
pub async fn get_existing<S: MarketplaceStore + ?Sized>(store: &S, key: AttributeValueHashMap, entity: &str) -> Result<AttributeValueHashMap, ApiError> {
    match store.get_item(key).await? {
        Some(item) => Ok(item),
        None => Err(ApiError::NotFound(entity.into()))
    }
}

/// Sets fields on an item that must already exist and returns its new
/// attributes. A missing item is reported as `NotFound(entity)`.
pub async fn update_existing<S: MarketplaceStore + ?Sized>(
    store: &S,
    key: AttributeValueHashMap,
    fields: Vec<(String, AttributeValue)>,
    entity: &str
) -> Result<AttributeValueHashMap, ApiError> {
    if fields.is_empty() {
        return Err(ApiError::InvalidRequest("there are no fields to update".into()));
    }
    match store.update_item(key, ItemUpdate::set_existing(fields)).await {
        Err(ApiError::ConditionFailed) => Err(ApiError::NotFound(entity.into())),
        other => other,
    }
}

/// One clause of an update expression.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// `SET #name = :value`
    Set(String, AttributeValue),
    /// `SET #name = #name - :value`, for numbers.
    Subtract(String, AttributeValue),
}

/// Guard evaluated against the stored item before a write.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `attribute_exists(PK)`
    ItemExists,
    /// `attribute_not_exists(PK)`
    ItemAbsent,
    /// `attribute_exists(PK) AND #attribute > :value`
    ItemExistsAndGreaterThan {
        attribute: String,
        value: AttributeValue,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    pub actions: Vec<UpdateAction>,
    pub condition: Option<Condition>,
}

impl ItemUpdate {
    /// Sets each `(name, value)` pair, only if the item already exists.
    pub fn set_existing(fields: Vec<(String, AttributeValue)>) -> Self {
        Self {
            actions: fields.into_iter().map(|(k, v)| UpdateAction::Set(k, v)).collect(),
            condition: Some(Condition::ItemExists),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortCondition {
    Equals(String),
    BeginsWith(String),
}

/// A key condition against the table or one of its indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub index: Option<Index>,
    pub partition_value: String,
    pub sort: SortCondition,
}

impl Query {
    pub fn table(partition_value: String, sort: SortCondition) -> Self {
        Self { index: None, partition_value, sort }
    }

    pub fn index(index: Index, partition_value: String, sort: SortCondition) -> Self {
        Self { index: Some(index), partition_value, sort }
    }

    pub fn partition_attribute(&self) -> &'static str {
        self.index.map_or(MARKETPLACE_TABLE.pk.key, |i| i.partition_key)
    }

    pub fn sort_attribute(&self) -> &'static str {
        self.index.map_or(MARKETPLACE_TABLE.sk.key, |i| i.sort_key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactWrite {
    Update {
        key: AttributeValueHashMap,
        update: ItemUpdate,
    },
    Put {
        item: AttributeValueHashMap,
        condition: Option<Condition>,
    },
}

/// Collects placeholder names and values while an expression is written.
#[derive(Debug, Default)]
pub(crate) struct Expression {
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl Expression {
    /// Returns the `#` placeholder for an attribute name, reusing it if the
    /// name was already seen.
    pub fn name(&mut self, attribute: &str) -> String {
        if let Some((placeholder, _)) = self.names.iter().find(|(_, v)| v.as_str() == attribute) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    pub fn value(&mut self, value: AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value);
        placeholder
    }

    pub fn update(&mut self, actions: &[UpdateAction]) -> String {
        let clauses = actions.iter()
            .map(|action| match action {
                UpdateAction::Set(attribute, value) => {
                    let n = self.name(attribute);
                    let v = self.value(value.clone());
                    format!("{} = {}", n, v)
                }
                UpdateAction::Subtract(attribute, value) => {
                    let n = self.name(attribute);
                    let v = self.value(value.clone());
                    format!("{} = {} - {}", n, n, v)
                }
            })
            .collect::<Vec<_>>();
        format!("SET {}", clauses.join(", "))
    }

    pub fn condition(&mut self, condition: &Condition) -> String {
        let pk = self.name(MARKETPLACE_TABLE.pk.key);
        match condition {
            Condition::ItemExists => format!("attribute_exists({})", pk),
            Condition::ItemAbsent => format!("attribute_not_exists({})", pk),
            Condition::ItemExistsAndGreaterThan { attribute, value } => {
                let n = self.name(attribute);
                let v = self.value(value.clone());
                format!("attribute_exists({}) AND {} > {}", pk, n, v)
            }
        }
    }

    pub fn key_condition(&mut self, query: &Query) -> String {
        let pk = self.name(query.partition_attribute());
        let pv = self.value(AttributeValue::S(query.partition_value.clone()));
        let sk = self.name(query.sort_attribute());
        match &query.sort {
            SortCondition::Equals(s) => {
                let sv = self.value(AttributeValue::S(s.clone()));
                format!("{} = {} AND {} = {}", pk, pv, sk, sv)
            }
            SortCondition::BeginsWith(s) => {
                let sv = self.value(AttributeValue::S(s.clone()));
                format!("{} = {} AND begins_with({}, {})", pk, pv, sk, sv)
            }
        }
    }

    /// DynamoDB rejects empty placeholder maps, so they are only sent when used.
    pub fn into_parts(self) -> (Option<HashMap<String, String>>, Option<HashMap<String, AttributeValue>>) {
        (
            (!self.names.is_empty()).then_some(self.names),
            (!self.values.is_empty()).then_some(self.values),
        )
    }
}
