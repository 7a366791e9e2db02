//! Reads one of a seller's products.

utils::impl_function_handler!(utils::products::get_product);
