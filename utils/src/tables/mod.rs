//! Module containing database table information, including:
//! * key layout
//! * secondary indexes
//! * item names

use crate::dynamodb::maps_mk2::AttrValAbstraction;

pub mod marketplace;

/// An attribute name paired with the type it is stored as.
pub struct Item<T: AttrValAbstraction> {
    pub key: &'static str,
    pub ty: T
}

impl<T: AttrValAbstraction> Item<T> {
    pub const fn new(key: &'static str) -> Self {
        Self { key, ty: T::TYPE }
    }
}

/// Lets the typed map helpers accept `Item`s by value or by reference.
pub trait DynamoDBAttributeValue {
    type ItemType: AttrValAbstraction;
    fn get_key(&self) -> &'static str;
}

impl<T: AttrValAbstraction> DynamoDBAttributeValue for Item<T> {
    type ItemType = T;
    #[inline]
    fn get_key(&self) -> &'static str {
        self.key
    }
}

impl<T: AttrValAbstraction> DynamoDBAttributeValue for &Item<T> {
    type ItemType = T;
    #[inline]
    fn get_key(&self) -> &'static str {
        self.key
    }
}

/// A global secondary index and the attributes it is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub name: &'static str,
    pub partition_key: &'static str,
    pub sort_key: &'static str,
}
