//! Reads one of a client's orders.

utils::impl_function_handler!(utils::orders::get_order_for_client);
