//! Updates one field of a seller's order.

utils::impl_function_handler!(utils::orders::update_order_for_seller);
