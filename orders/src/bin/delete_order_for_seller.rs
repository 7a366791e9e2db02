//! Deletes a seller's order.

utils::impl_function_handler!(utils::orders::delete_order_for_seller);
