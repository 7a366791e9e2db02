//! Finds the client or seller registered with a Cognito id.

utils::impl_function_handler!(utils::users::get_user_by_cognito_id);
