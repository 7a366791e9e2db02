//! Shared code for the marketplace Lambda functions.
//!
//! Every function binary in the workspace is a thin wrapper around one of the
//! operations in this crate. The operations talk to the single DynamoDB table
//! through the [`store::MarketplaceStore`] trait, so they can be exercised
//! against an in-memory store in tests.

pub mod config;
pub mod dynamodb;
pub mod error;
pub mod function_handler_macro;
pub mod request;
pub mod response;
pub mod store;
pub mod tables;

pub mod clients;
pub mod orders;
pub mod products;
pub mod sellers;
pub mod users;

pub use lambda_http;
pub use tracing;

use error::ApiError;

/// Logs a step of an operation at debug level.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}

pub trait OptionHandler<T> {
    /// Unwraps an Option that should be included in a request.
    ///
    /// Returns an error naming the missing field if it isn't there.
    fn should_exist_in_request(&self, name: &str) -> Result<&T, ApiError>;
}

impl<T> OptionHandler<T> for Option<T> {
    #[inline]
    fn should_exist_in_request(&self, name: &str) -> Result<&T, ApiError> {
        match self {
            Some(x) => Ok(x),
            None => Err(ApiError::InvalidRequest(format!("`{}` is missing", name)))
        }
    }
}

/// Returns true when a required text field is absent or only whitespace.
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
