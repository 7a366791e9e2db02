//! Creates a seller.

utils::impl_function_handler!(utils::sellers::create_seller);
