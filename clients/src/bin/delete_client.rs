//! Deletes a client.

utils::impl_function_handler!(utils::clients::delete_client);
