use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderRef;

const ORDER_REF_LEN: usize = 12;

/// Generates a fresh opaque order reference, e.g. `ord-9XkQ2mVb71Lw`.
///
/// Uniqueness is ultimately enforced by the database constraint on the orders table; at 12 alphanumeric characters a
/// collision will not happen in practice.
pub fn new_order_ref() -> OrderRef {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(ORDER_REF_LEN).map(char::from).collect();
    OrderRef(format!("ord-{suffix}"))
}
