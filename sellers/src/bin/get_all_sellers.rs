//! Lists every seller.

utils::impl_function_handler!(utils::sellers::get_all_sellers);
