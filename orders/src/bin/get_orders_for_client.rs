//! Lists a client's orders.

utils::impl_function_handler!(utils::orders::get_orders_for_client);
