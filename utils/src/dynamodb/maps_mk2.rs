//! Simplifies working with `HashMap<String, AttributeValue>` by pairing each
//! attribute name with the type it is stored as.

use std::collections::HashMap;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::ApiError;
use crate::tables::DynamoDBAttributeValue;

pub type AttributeValueHashMap = HashMap<String, AttributeValue>;

/// Abstracts the creation and retrieval of `AttributeValue`s from a HashMap.
///
/// The available generics that can be used are:
///
/// * `N` - Number (String)
/// * `S` - String
///
/// # Example
/// ```rust
/// use utils::dynamodb::maps_mk2::*;
/// use utils::tables::Item;
/// let mut map = AttributeValueHashMap::new();
///
/// const STOCK: Item<N> = Item::new("stock");
/// const NAME: Item<S> = Item::new("productName");
///
/// map.insert_item(STOCK, 5.to_string());
/// assert_eq!(map.get_item(STOCK).unwrap(), &5.to_string());
///
/// map.insert_item_into(NAME, "Coffee");
/// assert_eq!(map.get_item(NAME).unwrap(), "Coffee");
/// ```
trait AbstractAttributeValueMaps {
    /// Inserts an attribute value into an AttributeValueHashMap
    fn insert_attr_val<A: AttrValAbstraction>(&mut self, key: &str, data: A::ArgType);
    /// Gets an attribute value.
    fn get_attr_val<A: AttrValAbstraction>(&self, key: &str) -> Result<&A::ArgType, ApiError>;
}

impl AbstractAttributeValueMaps for AttributeValueHashMap {
    #[inline]
    fn insert_attr_val<A: AttrValAbstraction>(&mut self, key: &str, data: A::ArgType) {
        self.insert(key.to_string(), A::attribute_value(data));
    }
    #[inline]
    fn get_attr_val<A: AttrValAbstraction>(&self, key: &str) -> Result<&A::ArgType, ApiError> {
        let attr_val = match self.get(key) {
            Some(x) => x,
            None => return Err(ApiError::InvalidDbSchema(format!("Key `{}` was not in the hashmap", key)))
        };
        let val = match A::get_val(attr_val) {
            Ok(v) => v,
            Err(_) => return Err(ApiError::InvalidDbSchema(format!("Key `{}` AttributeValue had a mismatched type in the database", key)))
        };
        Ok(val)
    }
}

pub trait AttrValAbstraction {
    /// The argument type for initializing an `AttributeValue`.
    type ArgType: Clone;
    /// The marker value stored in an `Item`.
    const TYPE: Self;
    /// Initializes an `AttributeValue` from an `ArgType`.
    fn attribute_value(data: Self::ArgType) -> AttributeValue;
    /// Gets the `ArgType` from an `AttributeValue`.
    fn get_val(attr_val: &AttributeValue) -> Result<&Self::ArgType, &AttributeValue>;
}

macro_rules! impl_attr_val_abstraction {
    ($struct:ident, $arg_type:ty, $member_name:ident, $as_type:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy)]
        pub struct $struct;
        impl AttrValAbstraction for $struct {
            type ArgType = $arg_type;
            const TYPE: Self = $struct;
            #[inline]
            fn attribute_value(data: Self::ArgType) -> AttributeValue {
                AttributeValue::$member_name(data)
            }
            #[inline]
            fn get_val(attr_val: &AttributeValue) -> Result<&Self::ArgType, &AttributeValue> {
                attr_val.$as_type()
            }
        }
    };
}

impl_attr_val_abstraction!(N, String, N, as_n, "The `Number` generic type for an `AttributeValue`");
impl_attr_val_abstraction!(S, String, S, as_s, "The `String` generic type for an `AttributeValue`");

pub trait ItemIntegration {
    /// Inserts an item into the `AttributeValueHashMap`.
    fn insert_item<D: DynamoDBAttributeValue>(&mut self, item: D, value: <D::ItemType as AttrValAbstraction>::ArgType);
    /// Inserts an item into the `AttributeValueHashMap`, calling `.into()` on the value.
    fn insert_item_into<I: Into<<D::ItemType as AttrValAbstraction>::ArgType>, D: DynamoDBAttributeValue>(&mut self, item: D, value: I);
    /// Gets the value for an item from an `AttributeValueHashMap`.
    fn get_item<D: DynamoDBAttributeValue>(&self, item: D) -> Result<&<D::ItemType as AttrValAbstraction>::ArgType, ApiError>;
    /// Gets the value for an item that is allowed to be absent.
    ///
    /// A present value of the wrong type is still an error.
    fn get_optional_item<D: DynamoDBAttributeValue>(&self, item: D) -> Result<Option<&<D::ItemType as AttrValAbstraction>::ArgType>, ApiError>;
}

impl ItemIntegration for AttributeValueHashMap {
    #[inline]
    fn insert_item<D: DynamoDBAttributeValue>(&mut self, item: D, value: <D::ItemType as AttrValAbstraction>::ArgType) {
        self.insert_attr_val::<D::ItemType>(item.get_key(), value)
    }
    #[inline]
    fn insert_item_into<I: Into<<D::ItemType as AttrValAbstraction>::ArgType>, D: DynamoDBAttributeValue>(&mut self, item: D, value: I) {
        self.insert_attr_val::<D::ItemType>(item.get_key(), value.into())
    }
    #[inline]
    fn get_item<D: DynamoDBAttributeValue>(&self, item: D) -> Result<&<D::ItemType as AttrValAbstraction>::ArgType, ApiError> {
        self.get_attr_val::<D::ItemType>(item.get_key())
    }
    #[inline]
    fn get_optional_item<D: DynamoDBAttributeValue>(&self, item: D) -> Result<Option<&<D::ItemType as AttrValAbstraction>::ArgType>, ApiError> {
        if self.contains_key(item.get_key()) {
            self.get_attr_val::<D::ItemType>(item.get_key()).map(Some)
        } else {
            Ok(None)
        }
    }
}
