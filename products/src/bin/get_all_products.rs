//! Lists every product.

utils::impl_function_handler!(utils::products::get_all_products);
