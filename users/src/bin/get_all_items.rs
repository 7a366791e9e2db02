//! Scans the whole table.

utils::impl_function_handler!(utils::users::get_all_items);
