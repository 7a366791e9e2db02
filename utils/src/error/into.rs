use std::num::ParseFloatError;

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};

use super::ApiError;

/// The error code DynamoDB uses when a `ConditionExpression` does not hold.
pub const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";

impl<E> From<SdkError<E, HttpResponse>> for ApiError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    fn from(err: SdkError<E, HttpResponse>) -> Self {
        let code = err.code().unwrap_or("UnknownError").to_string();
        if code == CONDITIONAL_CHECK_FAILED {
            return Self::ConditionFailed;
        }
        let status = err.raw_response().map(|r| r.status().as_u16()).unwrap_or(500);
        let message = match err.message() {
            Some(m) => m.to_string(),
            None => DisplayErrorContext(&err).to_string(),
        };
        Self::Storage { status, code, message }
    }
}

impl From<BuildError> for ApiError {
    fn from(value: BuildError) -> Self {
        Self::ServerError(format!("DynamoDB request build error: {}", value))
    }
}

impl From<serde_dynamo::Error> for ApiError {
    fn from(value: serde_dynamo::Error) -> Self {
        Self::InvalidDbSchema(format!("Item conversion error: {}", value))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::ServerError(format!("JSON error: {}", value))
    }
}

impl From<ParseFloatError> for ApiError {
    fn from(value: ParseFloatError) -> Self {
        Self::ServerError(format!("Parse float error: {}", value))
    }
}
