//! # Database management and control.
//!
//! This module defines the interface contracts that storefront database *backends* must implement.
//!
//! ## The settlement core
//! The central trait is [`SettlementDatabase`]: it owns the single atomic step that turns a user's cart into an
//! immutable order (order row + line snapshots + cart drain + wallet debit, all-or-nothing). Everything else exists
//! in service of that step.
//!
//! ## Traits
//! * [`SettlementDatabase`] defines the highest level of behaviour for backends supporting the settlement engine.
//! * [`InventoryManagement`] is the inventory ledger: atomic, non-negative stock reservation and release.
//! * [`CartManagement`] owns cart lines, pairing every cart mutation with the matching inventory mutation.
//! * [`WalletManagement`] owns the user balance: atomic, non-negative debit and credit.
//! * [`FulfillmentTracking`] transitions orders to delivered and records per-product feedback.
//! * [`CatalogManagement`] is the seam to the out-of-scope admin/catalog layer (products, categories, streets).
mod cart_management;
mod catalog_management;
mod fulfillment_tracking;
mod inventory_management;
mod settlement_database;
mod wallet_management;

pub use cart_management::{CartError, CartManagement};
pub use catalog_management::{CatalogError, CatalogManagement};
pub use fulfillment_tracking::{FulfillmentError, FulfillmentTracking};
pub use inventory_management::{InventoryError, InventoryManagement};
pub use settlement_database::{SettlementDatabase, SettlementError};
pub use wallet_management::{WalletError, WalletManagement};
