/// Generates the `function_handler` and `main` of a Lambda function that runs
/// one operation.
///
/// The operation must have the signature
/// `async fn(&S, &OperationInput) -> Result<ApiResponse, ApiError>` where `S`
/// is a `MarketplaceStore`. The configuration and the DynamoDB client are set
/// up once per process in `main`; every invocation shares them.
///
/// The binary must depend on `tokio` with the `macros` feature.
///
/// ```ignore
/// utils::impl_function_handler!(utils::clients::get_client);
/// ```
#[macro_export]
macro_rules! impl_function_handler {
    ($operation:path) => {
        async fn function_handler(
            store: &$crate::store::DynamoStore,
            event: $crate::lambda_http::Request,
        ) -> Result<$crate::lambda_http::Response<$crate::lambda_http::Body>, $crate::lambda_http::Error> {
            $crate::debug_log!("In function_handler");
            let input = $crate::request::OperationInput::from_request(&event);
            match $operation(store, &input).await {
                Ok(response) => response.respond(),
                Err(e) => e.respond(),
            }
        }

        #[tokio::main]
        async fn main() -> Result<(), $crate::lambda_http::Error> {
            $crate::lambda_http::tracing::init_default_subscriber();
            let config = $crate::config::Config::from_env()?;
            let store = $crate::store::DynamoStore::from_config(&config).await;
            let store_ref = &store;
            $crate::lambda_http::run($crate::lambda_http::service_fn(move |event| async move {
                function_handler(store_ref, event).await
            }))
            .await
        }
    };
}
