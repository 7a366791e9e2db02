//! Deletes a seller.

utils::impl_function_handler!(utils::sellers::delete_seller);
