//! Layout of the single marketplace table.
//!
//! | Entity  | PK                  | SK                     | type      |
//! |---------|---------------------|------------------------|-----------|
//! | Client  | `CLIENT#{clientId}` | `#METADATA#{clientId}` | `client`  |
//! | Seller  | `SELLER#{sellerId}` | `#METADATA#{sellerId}` | `seller`  |
//! | Product | `SELLER#{sellerId}` | `PRODUCT#{productId}`  | `product` |
//! | Order   | `CLIENT#{clientId}` | `ORDER#{orderId}`      | `order`   |
//!
//! Orders store `sellerId` with its `SELLER#` prefix so that the by-seller
//! index can be queried with the same value as a seller's partition key.

use super::{Index, Item};
use crate::dynamodb::maps_mk2::*;

pub const CLIENT_PREFIX: &str = "CLIENT#";
pub const SELLER_PREFIX: &str = "SELLER#";
pub const METADATA_PREFIX: &str = "#METADATA#";
pub const PRODUCT_PREFIX: &str = "PRODUCT#";
pub const ORDER_PREFIX: &str = "ORDER#";

pub struct MarketplaceTable {
    /// partition key
    pub pk: Item<S>,
    /// sort key
    pub sk: Item<S>,
    /// entity discriminator, also the partition key of `BY_TYPE`
    pub entity_type: Item<S>,
    pub client_id: Item<S>,
    /// partition key of `BY_SELLER`
    pub seller_id: Item<S>,
    /// partition key of `BY_COGNITO_ID`
    pub cognito_id: Item<S>,
    pub client_name: Item<S>,
    pub last_name: Item<S>,
    pub seller_name: Item<S>,
    pub product_name: Item<S>,
    pub price: Item<N>,
    pub stock: Item<N>,
}

pub const MARKETPLACE_TABLE: MarketplaceTable = MarketplaceTable {
    pk: Item::new("PK"),
    sk: Item::new("SK"),
    entity_type: Item::new("type"),
    client_id: Item::new("clientId"),
    seller_id: Item::new("sellerId"),
    cognito_id: Item::new("cognitoId"),
    client_name: Item::new("clientName"),
    last_name: Item::new("lastName"),
    seller_name: Item::new("sellerName"),
    product_name: Item::new("productName"),
    price: Item::new("price"),
    stock: Item::new("stock"),
};

/// Orders by seller: `sellerId` + `SK`.
pub const BY_SELLER: Index = Index {
    name: "GSI1",
    partition_key: "sellerId",
    sort_key: "SK",
};

/// Items by entity kind: `type` + `PK`.
pub const BY_TYPE: Index = Index {
    name: "GSI2",
    partition_key: "type",
    sort_key: "PK",
};

/// Client or seller metadata by external identity: `cognitoId` + `SK`.
pub const BY_COGNITO_ID: Index = Index {
    name: "GSI3",
    partition_key: "cognitoId",
    sort_key: "SK",
};

/// The `type` discriminator of each entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Client,
    Seller,
    Product,
    Order,
}

impl EntityType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Seller => "seller",
            Self::Product => "product",
            Self::Order => "order",
        }
    }
}

pub fn client_pk(client_id: &str) -> String {
    format!("{}{}", CLIENT_PREFIX, client_id)
}

pub fn seller_pk(seller_id: &str) -> String {
    format!("{}{}", SELLER_PREFIX, seller_id)
}

pub fn metadata_sk(id: &str) -> String {
    format!("{}{}", METADATA_PREFIX, id)
}

pub fn product_sk(product_id: &str) -> String {
    format!("{}{}", PRODUCT_PREFIX, product_id)
}

pub fn order_sk(order_id: &str) -> String {
    format!("{}{}", ORDER_PREFIX, order_id)
}

/// Builds a primary key map from a partition and sort value.
pub fn primary_key(pk: String, sk: String) -> AttributeValueHashMap {
    let mut key = AttributeValueHashMap::with_capacity(2);
    key.insert_item(MARKETPLACE_TABLE.pk, pk);
    key.insert_item(MARKETPLACE_TABLE.sk, sk);
    key
}

pub fn client_key(client_id: &str) -> AttributeValueHashMap {
    primary_key(client_pk(client_id), metadata_sk(client_id))
}

pub fn seller_key(seller_id: &str) -> AttributeValueHashMap {
    primary_key(seller_pk(seller_id), metadata_sk(seller_id))
}

pub fn product_key(seller_id: &str, product_id: &str) -> AttributeValueHashMap {
    primary_key(seller_pk(seller_id), product_sk(product_id))
}

pub fn order_key(client_id: &str, order_id: &str) -> AttributeValueHashMap {
    primary_key(client_pk(client_id), order_sk(order_id))
}
