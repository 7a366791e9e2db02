//! Places an order.

utils::impl_function_handler!(utils::orders::create_order);
