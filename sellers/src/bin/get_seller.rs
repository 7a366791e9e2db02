//! Reads a seller.

utils::impl_function_handler!(utils::sellers::get_seller);
