//! Creates a client.

utils::impl_function_handler!(utils::clients::create_client);
