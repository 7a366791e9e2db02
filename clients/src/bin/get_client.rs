//! Reads a client.

utils::impl_function_handler!(utils::clients::get_client);
