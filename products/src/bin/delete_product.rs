//! Deletes a product.

utils::impl_function_handler!(utils::products::delete_product);
