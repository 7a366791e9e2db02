//! Order placement and the client-side and seller-side order operations.
//!
//! Orders are stored in the client's partition. The seller-side operations
//! find an order through the by-seller index first, which yields the owning
//! client, and then act on the order's primary key.
//!
//! Placing an order reads the product, the client and the seller
//! concurrently, checks the requested quantity against the product's stock,
//! and then writes the stock decrement and the new order in one transaction.
//! The decrement is conditioned on the stock still covering the quantity, so
//! concurrent orders can not oversell a product between the check and the
//! write.

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dynamodb::maps_mk2::{AttributeValueHashMap, ItemIntegration};
use crate::dynamodb::{item_to_json, items_to_json, to_attribute_value, to_item};
use crate::error::ApiError;
use crate::request::OperationInput;
use crate::response::ApiResponse;
use crate::store::{
    get_existing, update_existing, Condition, ItemUpdate, MarketplaceStore, Query, SortCondition, TransactWrite, UpdateAction,
};
use crate::tables::marketplace::{
    client_key, client_pk, order_key, order_sk, product_key, seller_key, seller_pk, EntityType, BY_SELLER, MARKETPLACE_TABLE, ORDER_PREFIX,
};
use crate::{debug_log, OptionHandler};

const ENTITY: &str = "Order";

/// How long an order stays valid after it is placed: 7 days.
pub const ORDER_LIFETIME_MS: i64 = 604_800_000;
pub const PENDING_STATUS: &str = "Pending";
pub const INSUFFICIENT_STOCK: &str = "insufficient stock";

#[derive(Debug, Deserialize)]
pub struct NewOrder {
    /// Any JSON number; it must hold a positive whole value.
    pub quantity: Option<f64>,
}

impl NewOrder {
    pub fn quantity(&self) -> Result<i64, ApiError> {
        let quantity = *self.quantity.should_exist_in_request("quantity")?;
        if !quantity.is_finite() || quantity.fract() != 0.0 || quantity < 1.0 || quantity > i64::MAX as f64 {
            return Err(ApiError::InvalidRequest("`quantity` must be a positive whole number".into()));
        }
        Ok(quantity as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub order_status: String,
    /// Stored with the `SELLER#` prefix, as the by-seller index expects.
    pub seller_id: String,
    pub product_id: String,
    pub start_date: String,
    pub exp_date: String,
    pub client_id: String,
    pub order_id: String,
    pub quantity: i64,
    pub final_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    pub client_name: String,
}

/// The ids an order is placed with.
#[derive(Debug, Clone, Copy)]
pub struct OrderIds<'a> {
    pub client_id: &'a str,
    pub seller_id: &'a str,
    pub product_id: &'a str,
    pub order_id: &'a str,
}

impl Order {
    /// Builds a pending order from the stored product, client and seller.
    ///
    /// The price, product name, seller name and client name are copied from
    /// the items as they are now.
    pub fn new(
        ids: OrderIds,
        quantity: i64,
        product: &AttributeValueHashMap,
        client: &AttributeValueHashMap,
        seller: &AttributeValueHashMap,
        now: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let price = product.get_item(MARKETPLACE_TABLE.price)?.parse::<f64>()?;
        let client_name = format!(
            "{} {}",
            client.get_item(MARKETPLACE_TABLE.client_name)?,
            client.get_item(MARKETPLACE_TABLE.last_name)?
        );
        Ok(Self {
            pk: client_pk(ids.client_id),
            sk: order_sk(ids.order_id),
            entity_type: EntityType::Order.as_str().into(),
            order_status: PENDING_STATUS.into(),
            seller_id: seller_pk(ids.seller_id),
            product_id: ids.product_id.to_string(),
            start_date: timestamp(now),
            exp_date: timestamp(now + Duration::milliseconds(ORDER_LIFETIME_MS)),
            client_id: ids.client_id.to_string(),
            order_id: ids.order_id.to_string(),
            quantity,
            final_price: quantity as f64 * price,
            product_name: product.get_optional_item(MARKETPLACE_TABLE.product_name)?.cloned(),
            seller_name: seller.get_optional_item(MARKETPLACE_TABLE.seller_name)?.cloned(),
            client_name,
        })
    }
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An order can only be placed while the stock is strictly greater than the
/// quantity, so ordering exactly the remaining stock is refused.
pub fn has_sufficient_stock(stock: f64, quantity: i64) -> bool {
    stock > quantity as f64
}

/// The transaction that places an order: decrement the product's stock while
/// it still covers the quantity, and insert the order if its key is unused.
fn placement_writes(product: AttributeValueHashMap, quantity: i64, order: AttributeValueHashMap) -> Vec<TransactWrite> {
    let stock = MARKETPLACE_TABLE.stock.key.to_string();
    let quantity = AttributeValue::N(quantity.to_string());
    vec![
        TransactWrite::Update {
            key: product,
            update: ItemUpdate {
                actions: vec![UpdateAction::Subtract(stock.clone(), quantity.clone())],
                condition: Some(Condition::ItemExistsAndGreaterThan { attribute: stock, value: quantity }),
            },
        },
        TransactWrite::Put {
            item: order,
            condition: Some(Condition::ItemAbsent),
        },
    ]
}

/// `POST /clients/{PK}/sellers/{sellerPK}/products/{productPK}/orders`
pub async fn create_order<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let seller_id = input.path_parameter("sellerPK")?;
    let product_id = input.path_parameter("productPK")?;
    let request: NewOrder = input.payload()?;
    let quantity = request.quantity()?;

    let (product, client, seller) = tokio::try_join!(
        store.get_item(product_key(seller_id, product_id)),
        store.get_item(client_key(client_id)),
        store.get_item(seller_key(seller_id)),
    )?;
    let product = product.ok_or_else(|| ApiError::NotFound("Product".into()))?;
    let client = client.ok_or_else(|| ApiError::NotFound("Client".into()))?;
    let seller = seller.ok_or_else(|| ApiError::NotFound("Seller".into()))?;

    let stock = product.get_item(MARKETPLACE_TABLE.stock)?.parse::<f64>()?;
    if !has_sufficient_stock(stock, quantity) {
        tracing::warn!("Refused order of {} from stock {} of product {}", quantity, stock, product_id);
        return Err(ApiError::Conflict(INSUFFICIENT_STOCK.into()));
    }

    let order_id = Uuid::new_v4().to_string();
    let ids = OrderIds { client_id, seller_id, product_id, order_id: &order_id };
    let order = Order::new(ids, quantity, &product, &client, &seller, Utc::now())?;

    let writes = placement_writes(product_key(seller_id, product_id), quantity, to_item(&order)?);
    match store.transact_write(writes).await {
        Ok(()) => {}
        Err(ApiError::ConditionFailed) => return Err(placement_refused(store, seller_id, product_id).await),
        Err(e) => return Err(e),
    }
    debug_log!("Placed order {} for client {}", order_id, client_id);

    Ok(ApiResponse::created(serde_json::to_value(&order)?))
}

/// Explains a placement transaction whose condition failed. The product is
/// read again: if it is gone the order is refused as `NotFound`, otherwise
/// its stock no longer covers the quantity.
async fn placement_refused<S: MarketplaceStore + ?Sized>(store: &S, seller_id: &str, product_id: &str) -> ApiError {
    match store.get_item(product_key(seller_id, product_id)).await {
        Ok(Some(_)) => {
            tracing::warn!("Stock of product {} changed before the order was written", product_id);
            ApiError::Conflict(INSUFFICIENT_STOCK.into())
        }
        Ok(None) => {
            tracing::warn!("Product {} was deleted before the order was written", product_id);
            ApiError::NotFound("Product".into())
        }
        Err(e) => e,
    }
}

/// Finds a seller's order through the by-seller index.
async fn find_seller_order<S: MarketplaceStore + ?Sized>(store: &S, seller_id: &str, order_id: &str) -> Result<AttributeValueHashMap, ApiError> {
    let query = Query::index(BY_SELLER, seller_pk(seller_id), SortCondition::Equals(order_sk(order_id)));
    match store.query(query).await?.into_iter().next() {
        Some(item) => Ok(item),
        None => Err(ApiError::NotFound(ENTITY.into()))
    }
}

/// The primary key of a seller's order, resolved through the owning client.
async fn seller_order_key<S: MarketplaceStore + ?Sized>(store: &S, seller_id: &str, order_id: &str) -> Result<AttributeValueHashMap, ApiError> {
    let order = find_seller_order(store, seller_id, order_id).await?;
    let client_id = order.get_item(MARKETPLACE_TABLE.client_id)?;
    Ok(order_key(client_id, order_id))
}

/// `GET /clients/{PK}/orders/{orderPK}`
pub async fn get_order_for_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let order_id = input.path_parameter("orderPK")?;
    let item = get_existing(store, order_key(client_id, order_id), ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(item)?))
}

/// `GET /sellers/{PK}/orders/{orderPK}`
pub async fn get_order_for_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let order_id = input.path_parameter("orderPK")?;
    let item = find_seller_order(store, seller_id, order_id).await?;
    Ok(ApiResponse::ok(item_to_json(item)?))
}

/// `GET /clients/{PK}/orders`. A client without orders gets an empty list.
pub async fn get_orders_for_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let query = Query::table(client_pk(client_id), SortCondition::BeginsWith(ORDER_PREFIX.into()));
    Ok(ApiResponse::ok(items_to_json(store.query(query).await?)?))
}

/// `GET /sellers/{PK}/orders`
pub async fn get_orders_for_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let query = Query::index(BY_SELLER, seller_pk(seller_id), SortCondition::BeginsWith(ORDER_PREFIX.into()));
    let orders = store.query(query).await?;
    if orders.is_empty() {
        return Err(ApiError::NotFound("Orders".into()));
    }
    Ok(ApiResponse::ok(items_to_json(orders)?))
}

/// The attributes of an order that can be changed after it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderField {
    OrderStatus,
    Quantity,
    FinalPrice,
    StartDate,
    ExpDate,
}

impl OrderField {
    pub const fn attribute(&self) -> &'static str {
        match self {
            Self::OrderStatus => "orderStatus",
            Self::Quantity => "quantity",
            Self::FinalPrice => "finalPrice",
            Self::StartDate => "startDate",
            Self::ExpDate => "expDate",
        }
    }

    /// Checks that `value` is of the kind stored for this field.
    fn check(&self, value: &Value) -> Result<(), ApiError> {
        let valid = match self {
            Self::OrderStatus | Self::StartDate | Self::ExpDate => value.as_str().map_or(false, |s| !s.trim().is_empty()),
            Self::Quantity => value.as_i64().map_or(false, |q| q > 0),
            Self::FinalPrice => value.as_f64().map_or(false, |p| p >= 0.0),
        };
        if !valid {
            return Err(ApiError::InvalidRequest(format!("`{}` can not be set to {}", self.attribute(), value)));
        }
        Ok(())
    }
}

/// `{ "paramName": ..., "paramValue": ... }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub param_name: OrderField,
    pub param_value: Value,
}

impl OrderPatch {
    fn field(&self) -> Result<Vec<(String, AttributeValue)>, ApiError> {
        self.param_name.check(&self.param_value)?;
        Ok(vec![(self.param_name.attribute().to_string(), to_attribute_value(&self.param_value)?)])
    }
}

/// `PUT /clients/{PK}/orders/{orderPK}`
pub async fn update_order_for_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let order_id = input.path_parameter("orderPK")?;
    let patch: OrderPatch = input.payload()?;
    let attributes = update_existing(store, order_key(client_id, order_id), patch.field()?, ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(attributes)?))
}

/// `PUT /sellers/{PK}/orders/{orderPK}`
pub async fn update_order_for_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let order_id = input.path_parameter("orderPK")?;
    let patch: OrderPatch = input.payload()?;
    let field = patch.field()?;

    let key = seller_order_key(store, seller_id, order_id).await?;
    let attributes = update_existing(store, key, field, ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(attributes)?))
}

/// `DELETE /clients/{PK}/orders/{orderPK}`
pub async fn delete_order_for_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let order_id = input.path_parameter("orderPK")?;
    let key = order_key(client_id, order_id);
    get_existing(store, key.clone(), ENTITY).await?;
    store.delete_item(key).await?;
    Ok(ApiResponse::message("The order was deleted"))
}

/// `DELETE /sellers/{PK}/orders/{orderPK}`
pub async fn delete_order_for_seller<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let seller_id = input.path_parameter("PK")?;
    let order_id = input.path_parameter("orderPK")?;
    let key = seller_order_key(store, seller_id, order_id).await?;
    get_existing(store, key.clone(), ENTITY).await?;
    store.delete_item(key).await?;
    Ok(ApiResponse::message("The order was deleted"))
}
