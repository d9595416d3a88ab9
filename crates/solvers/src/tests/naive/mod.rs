mod extract_deepest_pool;
mod filters_out_of_price_orders;
mod limit_order_price;
mod reserves_too_small;
mod swap_less_than_reserves;
mod without_pool;
