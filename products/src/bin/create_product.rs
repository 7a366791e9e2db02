//! Creates a product for a seller.

utils::impl_function_handler!(utils::products::create_product);
