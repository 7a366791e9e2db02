use lambda_http::{http::StatusCode, Body, Error, Response};
use serde_json::json;

pub mod into;

#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    NotFound(String),
    Conflict(String),
    /// A conditional write was rejected by the store. Operations translate
    /// this into `NotFound` or `Conflict` depending on what they guarded.
    ConditionFailed,
    InvalidDbSchema(String),
    ServerError(String),
    /// A failure reported by DynamoDB, passed through as-is.
    Storage {
        status: u16,
        code: String,
        message: String,
    },
    Config(String),
}

impl ApiError {
    #[inline]
    pub fn get_status_code(&self) -> StatusCode {
        let status = match self {
            Self::InvalidRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::ConditionFailed => 409,
            Self::InvalidDbSchema(_) => 500,
            Self::ServerError(_) => 500,
            Self::Storage { status, .. } => *status,
            Self::Config(_) => 500,
        };
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// The JSON body sent back to the caller.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Storage { status, code, message } => json!({
                "statusCode": status,
                "code": code,
                "message": message,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }

    /// Returns an error response.
    pub fn respond(&self) -> Result<Response<Body>, Error> {
        match self {
            Self::Storage { .. } | Self::InvalidDbSchema(_) | Self::ServerError(_) | Self::Config(_) => {
                tracing::error!(status = self.get_status_code().as_u16(), "{}", self)
            }
            _ => tracing::info!(status = self.get_status_code().as_u16(), "{}", self),
        }
        Ok(Response::builder()
            .status(self.get_status_code())
            .header("content-type", "application/json")
            .body(self.body().to_string().into())
            .map_err(Box::new)?)
    }
}

macro_rules! write_fmt {
    ($f:expr, $fmt:expr, $repl:expr) => {
        $f.write_fmt(format_args!($fmt, $repl))
    };
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(x) => write_fmt!(f, "Invalid request: {}", x),
            Self::NotFound(x) => write_fmt!(f, "{} not found", x),
            Self::Conflict(x) => f.write_str(x),
            Self::ConditionFailed => f.write_str("The conditional request failed"),
            Self::InvalidDbSchema(x) => write_fmt!(f, "Invalid DB schema: {}", x),
            Self::ServerError(x) => write_fmt!(f, "Internal server error: {}", x),
            Self::Storage { code, message, .. } => f.write_fmt(format_args!("{}: {}", code, message)),
            Self::Config(x) => write_fmt!(f, "Configuration error: {}", x),
        }
    }
}

impl std::error::Error for ApiError {}
