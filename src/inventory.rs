//! Player inventory and the purchase transaction.
//!
//! The inventory is an ordered sequence of items; duplicates are allowed.
//! Purchases are a two-step transaction: if the item cannot be stowed after
//! credits were deducted, the deduction is rolled back so ledger and
//! inventory stay consistent.

use crate::items::Item;
use crate::resources::{LedgerError, Resource, ResourceLedger};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from inventory operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory is full ({capacity} slots)")]
    Full { capacity: usize },
}

/// Errors from the purchase transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error(transparent)]
    Credits(#[from] LedgerError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// An ordered, optionally capacity-limited item container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    /// `None` means unlimited cargo space.
    capacity: Option<usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// An inventory that rejects additions past `capacity` items.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// Append an item. Fails only when a capacity limit is set and reached.
    pub fn add(&mut self, item: Item) -> Result<(), InventoryError> {
        if let Some(capacity) = self.capacity {
            if self.items.len() >= capacity {
                return Err(InventoryError::Full { capacity });
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove the first item with the given name, returning it if present.
    pub fn remove_by_name(&mut self, name: &str) -> Option<Item> {
        let index = self.items.iter().position(|i| i.name == name)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|i| i.name == name)
    }

    /// Number of items with the given name (duplicates counted).
    pub fn count_of(&self, name: &str) -> usize {
        self.items.iter().filter(|i| i.name == name).count()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Buy an item: deduct credits, then stow the item.
///
/// The deduction uses the rejecting credit policy, so an unaffordable
/// purchase fails before anything changes. If stowing fails afterwards the
/// credits are restored as a compensating action.
pub fn purchase_item(
    ledger: &mut ResourceLedger,
    inventory: &mut Inventory,
    item: Item,
    cost: i64,
) -> Result<(), PurchaseError> {
    ledger.apply_delta(Resource::Credits, -cost)?;

    if let Err(err) = inventory.add(item) {
        // Compensate the deduction before surfacing the failure. Restoring
        // credits cannot itself fail since the delta is non-negative.
        let _ = ledger.apply_delta(Resource::Credits, cost);
        return Err(err.into());
    }

    Ok(())
}
