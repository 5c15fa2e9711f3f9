//! Storefront Settlement Engine
//!
//! This library contains the core commerce logic for the storefront: the shopping cart, the inventory ledger, the
//! internal wallet, and the settlement process that converts a mutable cart into an immutable order. It is
//! transport-agnostic; the web presentation layer calls into the APIs exposed here.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database. These are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@sfe_api`]). This provides the public-facing functionality of the settlement
//!    engine: cart manipulation, order placement, and fulfilment tracking. Backends need to implement the traits in
//!    the [`mod@traits`] module in order to drive these APIs.
//!
//! The settlement flow can also report co-purchase signals to an optional [`mod@recommender`] collaborator. The
//! collaborator is strictly best-effort; the engine functions identically with the no-op implementation.
pub mod db_types;
pub mod helpers;
pub mod recommender;
mod sfe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sfe_api::{cart_api::CartApi, fulfillment_api::FulfillmentApi, order_objects, settlement_api::SettlementApi};
pub use traits::{
    CartError,
    CartManagement,
    CatalogError,
    CatalogManagement,
    FulfillmentError,
    FulfillmentTracking,
    InventoryError,
    InventoryManagement,
    SettlementDatabase,
    SettlementError,
    WalletError,
    WalletManagement,
};
