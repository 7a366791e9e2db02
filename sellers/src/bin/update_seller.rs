//! Updates a seller's fields.

utils::impl_function_handler!(utils::sellers::update_seller);
