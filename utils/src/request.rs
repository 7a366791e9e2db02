//! What an operation gets out of an API Gateway event: path parameters and
//! the raw body.

use std::collections::HashMap;

use lambda_http::{Body, Request, RequestExt};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct OperationInput {
    path_parameters: HashMap<String, String>,
    body: Vec<u8>,
}

impl OperationInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_request(event: &Request) -> Self {
        let path_parameters = event.path_parameters_ref()
            .map(|params| {
                params.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        let body = match event.body() {
            Body::Empty => Vec::new(),
            Body::Text(text) => text.as_bytes().to_vec(),
            Body::Binary(bytes) => bytes.clone(),
        };
        Self { path_parameters, body }
    }

    pub fn with_path_parameter(mut self, name: &str, value: &str) -> Self {
        self.path_parameters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, body: &serde_json::Value) -> Self {
        let bytes = body.to_string().into_bytes();
        self.with_body(bytes)
    }

    /// Gets a non-empty path parameter.
    pub fn path_parameter(&self, name: &str) -> Result<&str, ApiError> {
        match self.path_parameters.get(name) {
            Some(v) if !v.is_empty() => Ok(v.as_str()),
            _ => Err(ApiError::InvalidRequest(format!("path parameter `{}` is missing", name)))
        }
    }

    /// Parses the JSON body into an operation's payload type.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(ApiError::InvalidRequest("the request body is empty".into()));
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::InvalidRequest(format!("the request body could not be read: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        client_name: String,
    }

    #[test]
    fn path_parameters() {
        let input = OperationInput::new().with_path_parameter("PK", "c1").with_path_parameter("orderPK", "");
        assert_eq!(input.path_parameter("PK").unwrap(), "c1");
        assert!(matches!(input.path_parameter("orderPK"), Err(ApiError::InvalidRequest(_))));
        assert!(matches!(input.path_parameter("sellerPK"), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn payloads() {
        let input = OperationInput::new().with_json(&json!({ "clientName": "Ana" }));
        assert_eq!(input.payload::<Payload>().unwrap().client_name, "Ana");

        let empty = OperationInput::new();
        assert!(matches!(empty.payload::<Payload>(), Err(ApiError::InvalidRequest(_))));

        let garbage = OperationInput::new().with_body("{not json");
        assert!(matches!(garbage.payload::<Payload>(), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn from_lambda_request() {
        let mut params = HashMap::new();
        params.insert("PK".to_string(), "s1".to_string());
        let event = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/sellers/s1/products")
            .body(Body::from(r#"{"clientName":"Ana"}"#))
            .unwrap()
            .with_path_parameters(params);

        let input = OperationInput::from_request(&event);
        assert_eq!(input.path_parameter("PK").unwrap(), "s1");
        assert_eq!(input.payload::<Payload>().unwrap().client_name, "Ana");
    }
}
