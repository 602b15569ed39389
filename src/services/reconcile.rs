use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// A desired child carries an identifier that is not among the parent's
    /// existing children. Rejected up front: an id belonging to another
    /// parent must not silently no-op through a scoped update.
    #[error("unknown child id {0}")]
    UnknownChildId(i32),
}

/// Desired state of one variant (SKU) in an upsert payload. An id means
/// "update that existing row"; no id means "insert a new row".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuInput {
    pub product_sku_id: Option<i32>,
    pub attr_name: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    pub ot_price: Option<f64>,
    pub image: Option<String>,
}

/// The minimal create/update/delete set that transforms the existing child
/// collection into the desired one.
#[derive(Debug, Clone, Default)]
pub struct SkuPlan {
    pub delete_ids: Vec<i32>,
    pub updates: Vec<SkuInput>,
    pub inserts: Vec<SkuInput>,
}

impl SkuPlan {
    pub fn is_empty(&self) -> bool {
        self.delete_ids.is_empty() && self.updates.is_empty() && self.inserts.is_empty()
    }
}

/// Compute the reconciliation plan for a parent whose existing children are
/// `existing_ids`. Creation is the degenerate case of an empty existing set.
///
/// Every existing id absent from the desired id-set is deleted; every
/// desired child with an id is updated in place; every desired child
/// without an id becomes an insert.
pub fn plan(existing_ids: &[i32], desired: &[SkuInput]) -> Result<SkuPlan, ReconcileError> {
    let existing: HashSet<i32> = existing_ids.iter().copied().collect();

    let mut result = SkuPlan::default();
    let mut keep: HashSet<i32> = HashSet::with_capacity(desired.len());

    for sku in desired {
        match sku.product_sku_id {
            Some(id) => {
                if !existing.contains(&id) {
                    return Err(ReconcileError::UnknownChildId(id));
                }
                keep.insert(id);
                result.updates.push(sku.clone());
            }
            None => result.inserts.push(sku.clone()),
        }
    }

    for &id in existing_ids {
        if !keep.contains(&id) {
            result.delete_ids.push(id);
        }
    }

    Ok(result)
}
