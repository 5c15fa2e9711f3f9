use serde::{Deserialize, Serialize};

use crate::db_types::{CartLine, Money};

/// A raw, unvalidated delivery address as submitted by the client.
///
/// Call [`AddressForm::validated`] to turn it into a [`ShippingAddress`]. An order can only be created from the
/// validated form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressForm {
    pub street_id: i64,
    pub is_private: bool,
    pub building: String,
    pub apartment: Option<String>,
}

impl AddressForm {
    pub fn new(street_id: i64, is_private: bool, building: impl Into<String>) -> Self {
        Self { street_id, is_private, building: building.into(), apartment: None }
    }

    pub fn with_apartment(mut self, apartment: impl Into<String>) -> Self {
        self.apartment = Some(apartment.into());
        self
    }

    /// Checks the form's internal consistency. A private house must not carry an apartment number, and an apartment
    /// building must carry one. Whether the street actually exists is checked later, against the database, at
    /// settlement time.
    pub fn validated(self) -> Result<ShippingAddress, String> {
        if self.building.trim().is_empty() {
            return Err("building number must not be empty".to_string());
        }
        let apartment = self.apartment.filter(|a| !a.trim().is_empty());
        match (self.is_private, &apartment) {
            (true, Some(_)) => Err("a private house does not have an apartment number".to_string()),
            (false, None) => Err("an apartment number is required for a non-private building".to_string()),
            _ => Ok(ShippingAddress {
                street_id: self.street_id,
                is_private: self.is_private,
                building: self.building,
                apartment,
            }),
        }
    }
}

/// A delivery address that has passed form validation. Only obtainable via [`AddressForm::validated`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street_id: i64,
    pub is_private: bool,
    pub building: String,
    pub apartment: Option<String>,
}

/// The current contents of a user's cart together with the total the cart would settle for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub user_id: i64,
    pub lines: Vec<CartLine>,
    pub total: Money,
}

impl CartSnapshot {
    pub fn new(user_id: i64, lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(CartLine::line_cost).sum();
        Self { user_id, lines, total }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
