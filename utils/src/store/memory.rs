//! An in-memory table with DynamoDB's condition and index semantics, used by
//! the operation tests.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use super::{Condition, ItemUpdate, MarketplaceStore, Query, SortCondition, TransactWrite, UpdateAction};
use crate::dynamodb::maps_mk2::{AttributeValueHashMap, ItemIntegration};
use crate::error::ApiError;
use crate::tables::marketplace::MARKETPLACE_TABLE;

type PrimaryKey = (String, String);

#[derive(Default)]
pub(crate) struct MemoryStore {
    items: Mutex<BTreeMap<PrimaryKey, AttributeValueHashMap>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

fn primary_key(map: &AttributeValueHashMap) -> Result<PrimaryKey, ApiError> {
    Ok((
        map.get_item(MARKETPLACE_TABLE.pk)?.clone(),
        map.get_item(MARKETPLACE_TABLE.sk)?.clone(),
    ))
}

fn validation_error(message: &str) -> ApiError {
    ApiError::Storage { status: 400, code: "ValidationException".into(), message: message.into() }
}

fn number(value: &AttributeValue) -> Result<f64, ApiError> {
    match value.as_n() {
        Ok(n) => n.parse::<f64>().map_err(|_| validation_error("invalid number")),
        Err(_) => Err(validation_error("operand type mismatch")),
    }
}

fn subtract(current: &AttributeValue, amount: &AttributeValue) -> Result<AttributeValue, ApiError> {
    if let (Ok(a), Ok(b)) = (current.as_n(), amount.as_n()) {
        if let (Ok(a), Ok(b)) = (a.parse::<i64>(), b.parse::<i64>()) {
            return Ok(AttributeValue::N((a - b).to_string()));
        }
    }
    Ok(AttributeValue::N((number(current)? - number(amount)?).to_string()))
}

fn condition_holds(condition: Option<&Condition>, current: Option<&AttributeValueHashMap>) -> Result<bool, ApiError> {
    let holds = match condition {
        None => true,
        Some(Condition::ItemExists) => current.is_some(),
        Some(Condition::ItemAbsent) => current.is_none(),
        Some(Condition::ItemExistsAndGreaterThan { attribute, value }) => match current.and_then(|i| i.get(attribute)) {
            Some(stored) => number(stored)?.partial_cmp(&number(value)?) == Some(CmpOrdering::Greater),
            None => false,
        },
    };
    Ok(holds)
}

fn apply_update(key: &AttributeValueHashMap, current: Option<&AttributeValueHashMap>, update: &ItemUpdate) -> Result<AttributeValueHashMap, ApiError> {
    let mut item = current.cloned().unwrap_or_else(|| key.clone());
    for action in &update.actions {
        match action {
            UpdateAction::Set(name, value) => {
                item.insert(name.clone(), value.clone());
            }
            UpdateAction::Subtract(name, value) => {
                let stored = item.get(name)
                    .ok_or_else(|| validation_error("The provided expression refers to an attribute that does not exist in the item"))?;
                let result = subtract(stored, value)?;
                item.insert(name.clone(), result);
            }
        }
    }
    Ok(item)
}

fn sort_matches(sort: &SortCondition, value: &str) -> bool {
    match sort {
        SortCondition::Equals(s) => value == s,
        SortCondition::BeginsWith(s) => value.starts_with(s.as_str()),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item without counting it as a write.
    pub fn insert(&self, item: AttributeValueHashMap) {
        let key = primary_key(&item).unwrap();
        self.items.lock().unwrap().insert(key, item);
    }

    pub fn get(&self, key: &AttributeValueHashMap) -> Option<AttributeValueHashMap> {
        let key = primary_key(key).unwrap();
        self.items.lock().unwrap().get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Makes every following write fail as if DynamoDB were unavailable.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The number of writes that were applied.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Storage {
                status: 500,
                code: "InternalServerError".into(),
                message: "Internal server error".into(),
            });
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    async fn get_item(&self, key: AttributeValueHashMap) -> Result<Option<AttributeValueHashMap>, ApiError> {
        let key = primary_key(&key)?;
        Ok(self.items.lock().unwrap().get(&key).cloned())
    }

    async fn put_item(&self, item: AttributeValueHashMap) -> Result<(), ApiError> {
        self.check_writable()?;
        let key = primary_key(&item)?;
        self.items.lock().unwrap().insert(key, item);
        self.record_write();
        Ok(())
    }

    async fn update_item(&self, key: AttributeValueHashMap, update: ItemUpdate) -> Result<AttributeValueHashMap, ApiError> {
        self.check_writable()?;
        let primary = primary_key(&key)?;
        let mut items = self.items.lock().unwrap();
        let current = items.get(&primary);
        if !condition_holds(update.condition.as_ref(), current)? {
            return Err(ApiError::ConditionFailed);
        }
        let updated = apply_update(&key, current, &update)?;
        items.insert(primary, updated.clone());
        self.record_write();
        Ok(updated)
    }

    async fn delete_item(&self, key: AttributeValueHashMap) -> Result<(), ApiError> {
        self.check_writable()?;
        let key = primary_key(&key)?;
        self.items.lock().unwrap().remove(&key);
        self.record_write();
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<AttributeValueHashMap>, ApiError> {
        let partition_attribute = query.partition_attribute();
        let sort_attribute = query.sort_attribute();
        let items = self.items.lock().unwrap();
        let mut found = items.values()
            .filter_map(|item| {
                let partition = item.get(partition_attribute)?.as_s().ok()?;
                let sort = item.get(sort_attribute)?.as_s().ok()?;
                (partition == &query.partition_value && sort_matches(&query.sort, sort))
                    .then(|| (sort.clone(), item.clone()))
            })
            .collect::<Vec<_>>();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found.into_iter().map(|(_, item)| item).collect())
    }

    async fn scan(&self) -> Result<Vec<AttributeValueHashMap>, ApiError> {
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }

    async fn transact_write(&self, writes: Vec<TransactWrite>) -> Result<(), ApiError> {
        self.check_writable()?;
        let mut items = self.items.lock().unwrap();

        // every condition is checked before anything is applied
        let mut staged = Vec::with_capacity(writes.len());
        for write in &writes {
            match write {
                TransactWrite::Update { key, update } => {
                    let primary = primary_key(key)?;
                    let current = items.get(&primary);
                    if !condition_holds(update.condition.as_ref(), current)? {
                        return Err(ApiError::ConditionFailed);
                    }
                    staged.push((primary, apply_update(key, current, update)?));
                }
                TransactWrite::Put { item, condition } => {
                    let primary = primary_key(item)?;
                    if !condition_holds(condition.as_ref(), items.get(&primary))? {
                        return Err(ApiError::ConditionFailed);
                    }
                    staged.push((primary, item.clone()));
                }
            }
        }
        for (primary, item) in staged {
            items.insert(primary, item);
        }
        self.record_write();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::marketplace::{client_key, product_key, BY_SELLER};

    fn product(stock: &str) -> AttributeValueHashMap {
        let mut item = product_key("s1", "p1");
        item.insert_item_into(MARKETPLACE_TABLE.stock, stock);
        item
    }

    #[tokio::test]
    async fn conditional_update() {
        let store = MemoryStore::new();
        let update = ItemUpdate::set_existing(vec![("stock".into(), AttributeValue::N("1".into()))]);
        let result = store.update_item(product_key("s1", "p1"), update.clone()).await;
        assert!(matches!(result, Err(ApiError::ConditionFailed)));
        assert_eq!(store.len(), 0);

        store.insert(product("10"));
        let updated = store.update_item(product_key("s1", "p1"), update).await.unwrap();
        assert_eq!(updated.get_item(MARKETPLACE_TABLE.stock).unwrap(), "1");
    }

    #[tokio::test]
    async fn greater_than_guard() {
        let store = MemoryStore::new();
        store.insert(product("5"));
        let decrement = |q: &str| ItemUpdate {
            actions: vec![UpdateAction::Subtract("stock".into(), AttributeValue::N(q.into()))],
            condition: Some(Condition::ItemExistsAndGreaterThan {
                attribute: "stock".into(),
                value: AttributeValue::N(q.into()),
            }),
        };
        assert!(matches!(store.update_item(product_key("s1", "p1"), decrement("5")).await, Err(ApiError::ConditionFailed)));
        let updated = store.update_item(product_key("s1", "p1"), decrement("4")).await.unwrap();
        assert_eq!(updated.get_item(MARKETPLACE_TABLE.stock).unwrap(), "1");
    }

    #[tokio::test]
    async fn transaction_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.insert(product("5"));
        let writes = vec![
            TransactWrite::Update {
                key: product_key("s1", "p1"),
                update: ItemUpdate {
                    actions: vec![UpdateAction::Subtract("stock".into(), AttributeValue::N("2".into()))],
                    condition: Some(Condition::ItemExists),
                },
            },
            TransactWrite::Put { item: product("9"), condition: Some(Condition::ItemAbsent) },
        ];
        assert!(matches!(store.transact_write(writes).await, Err(ApiError::ConditionFailed)));
        assert_eq!(store.get(&product_key("s1", "p1")).unwrap().get_item(MARKETPLACE_TABLE.stock).unwrap(), "5");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn index_query_skips_items_without_the_attribute() {
        let store = MemoryStore::new();
        store.insert(client_key("c1"));
        let mut order = crate::tables::marketplace::order_key("c1", "o1");
        order.insert_item_into(MARKETPLACE_TABLE.seller_id, "SELLER#s1");
        store.insert(order);

        let found = store.query(Query::index(BY_SELLER, "SELLER#s1".into(), SortCondition::BeginsWith("ORDER#".into()))).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_item(MARKETPLACE_TABLE.sk).unwrap(), "ORDER#o1");
    }
}
