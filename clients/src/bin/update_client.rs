//! Updates a client's fields.

utils::impl_function_handler!(utils::clients::update_client);
