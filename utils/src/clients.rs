//! Client operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dynamodb::{item_to_json, patch_fields, to_item};
use crate::error::ApiError;
use crate::is_blank;
use crate::request::OperationInput;
use crate::response::ApiResponse;
use crate::store::{get_existing, update_existing, MarketplaceStore};
use crate::tables::marketplace::{client_key, client_pk, metadata_sk, EntityType};
use crate::debug_log;

const ENTITY: &str = "Client";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub client_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub cognito_id: Option<String>,
}

/// A client's metadata item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub client_id: String,
    pub client_name: String,
    pub last_name: String,
    pub phone: String,
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_id: Option<String>,
}

/// The fields of a client that can be changed after creation.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl Client {
    /// Validates a creation request. Name, last name, phone and gender are
    /// required and may not be blank.
    pub fn new(client_id: String, request: NewClient) -> Result<Self, ApiError> {
        if is_blank(&request.client_name)
            || is_blank(&request.last_name)
            || is_blank(&request.phone)
            || is_blank(&request.gender)
        {
            return Err(ApiError::InvalidRequest("the client's values can not be empty".into()));
        }
        Ok(Self {
            pk: client_pk(&client_id),
            sk: metadata_sk(&client_id),
            entity_type: EntityType::Client.as_str().into(),
            client_id,
            client_name: request.client_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            phone: request.phone.unwrap_or_default(),
            gender: request.gender.unwrap_or_default(),
            cognito_id: request.cognito_id,
        })
    }
}

/// `POST /clients`
pub async fn create_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let request: NewClient = input.payload()?;
    let client = Client::new(Uuid::new_v4().to_string(), request)?;

    store.put_item(to_item(&client)?).await?;
    debug_log!("Created client {}", client.client_id);

    Ok(ApiResponse::created(serde_json::to_value(&client)?))
}

/// `GET /clients/{PK}`
pub async fn get_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let item = get_existing(store, client_key(client_id), ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(item)?))
}

/// `PUT /clients/{PK}`
pub async fn update_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    let patch: ClientPatch = input.payload()?;
    let attributes = update_existing(store, client_key(client_id), patch_fields(&patch)?, ENTITY).await?;
    Ok(ApiResponse::ok(item_to_json(attributes)?))
}

/// `DELETE /clients/{PK}`
pub async fn delete_client<S: MarketplaceStore + ?Sized>(store: &S, input: &OperationInput) -> Result<ApiResponse, ApiError> {
    let client_id = input.path_parameter("PK")?;
    store.delete_item(client_key(client_id)).await?;
    Ok(ApiResponse::message("The client was deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use lambda_http::http::StatusCode;
    use serde_json::json;

    fn ana() -> serde_json::Value {
        json!({
            "clientName": "Ana",
            "lastName": "Rojas",
            "phone": "+56 9 1234 5678",
            "gender": "F",
            "cognitoId": "cog-ana"
        })
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = MemoryStore::new();
        let created = create_client(&store, &OperationInput::new().with_json(&ana())).await.unwrap();
        assert_eq!(created.status, StatusCode::CREATED);

        let client_id = created.body["clientId"].as_str().unwrap().to_string();
        assert!(Uuid::parse_str(&client_id).is_ok());
        assert_eq!(created.body["PK"], format!("CLIENT#{}", client_id));
        assert_eq!(created.body["SK"], format!("#METADATA#{}", client_id));
        assert_eq!(created.body["type"], "client");

        let fetched = get_client(&store, &OperationInput::new().with_path_parameter("PK", &client_id)).await.unwrap();
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body, created.body);
    }

    #[tokio::test]
    async fn every_client_gets_a_fresh_id() {
        let store = MemoryStore::new();
        let a = create_client(&store, &OperationInput::new().with_json(&ana())).await.unwrap();
        let b = create_client(&store, &OperationInput::new().with_json(&ana())).await.unwrap();
        assert_ne!(a.body["clientId"], b.body["clientId"]);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let store = MemoryStore::new();
        for field in ["clientName", "lastName", "phone", "gender"] {
            let mut body = ana();
            body[field] = json!("  ");
            let result = create_client(&store, &OperationInput::new().with_json(&body)).await;
            assert!(matches!(result, Err(ApiError::InvalidRequest(_))), "{} accepted", field);

            body.as_object_mut().unwrap().remove(field);
            let result = create_client(&store, &OperationInput::new().with_json(&body)).await;
            assert!(matches!(result, Err(ApiError::InvalidRequest(_))), "missing {} accepted", field);
        }
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn cognito_id_is_optional() {
        let store = MemoryStore::new();
        let mut body = ana();
        body.as_object_mut().unwrap().remove("cognitoId");
        let created = create_client(&store, &OperationInput::new().with_json(&body)).await.unwrap();
        assert!(created.body.get("cognitoId").is_none());
    }

    #[tokio::test]
    async fn missing_client() {
        let store = MemoryStore::new();
        let input = OperationInput::new().with_path_parameter("PK", "nobody");
        assert!(matches!(get_client(&store, &input).await, Err(ApiError::NotFound(_))));

        let input = input.with_json(&json!({ "phone": "123" }));
        assert!(matches!(update_client(&store, &input).await, Err(ApiError::NotFound(_))));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn partial_update() {
        let store = MemoryStore::new();
        let created = create_client(&store, &OperationInput::new().with_json(&ana())).await.unwrap();
        let client_id = created.body["clientId"].as_str().unwrap();

        let input = OperationInput::new()
            .with_path_parameter("PK", client_id)
            .with_json(&json!({ "phone": "555-0100" }));
        let updated = update_client(&store, &input).await.unwrap();
        assert_eq!(updated.body["phone"], "555-0100");
        assert_eq!(updated.body["clientName"], "Ana");

        let empty = OperationInput::new().with_path_parameter("PK", client_id).with_json(&json!({}));
        assert!(matches!(update_client(&store, &empty).await, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn delete() {
        let store = MemoryStore::new();
        let created = create_client(&store, &OperationInput::new().with_json(&ana())).await.unwrap();
        let input = OperationInput::new().with_path_parameter("PK", created.body["clientId"].as_str().unwrap());

        let deleted = delete_client(&store, &input).await.unwrap();
        assert_eq!(deleted.status, StatusCode::OK);
        assert!(deleted.body["message"].is_string());
        assert!(matches!(get_client(&store, &input).await, Err(ApiError::NotFound(_))));
    }
}
