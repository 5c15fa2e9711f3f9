mod order_ref;

pub use order_ref::new_order_ref;
