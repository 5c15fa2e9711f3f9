pub mod cart_api;
pub mod fulfillment_api;
pub mod order_objects;
pub mod settlement_api;
