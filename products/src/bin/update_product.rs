//! Updates a product's fields.

utils::impl_function_handler!(utils::products::update_product);
