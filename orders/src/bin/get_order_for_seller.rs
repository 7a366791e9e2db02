//! Reads one of a seller's orders.

utils::impl_function_handler!(utils::orders::get_order_for_seller);
