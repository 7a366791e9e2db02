use lambda_http::{http::StatusCode, Body, Error, Response};
use serde_json::{json, Value};

/// A successful operation result: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: StatusCode::OK, body }
    }

    pub fn created(body: Value) -> Self {
        Self { status: StatusCode::CREATED, body }
    }

    /// A `200` with a `{ "message": ... }` body, used by deletes.
    pub fn message(message: &str) -> Self {
        Self::ok(json!({ "message": message }))
    }

    /// Returns a success response
    pub fn respond(&self) -> Result<Response<Body>, Error> {
        Ok(Response::builder()
            .status(self.status)
            .header("content-type", "application/json")
            .body(self.body.to_string().into())
            .map_err(Box::new)?)
    }
}
