//! Merge engines: fold one snapshot section into the planner's save document.
//!
//! Each engine mutates the document in place. `items` and `equipments` share
//! the material inventory, which the caller clears once before either runs.

pub mod equipment;
pub mod items;
pub mod students;

use crate::coerce;
use crate::save::Materials;

pub use equipment::merge_equipment;
pub use items::merge_items;
pub use students::{merge_students, StudentMerge};

/// Weighted sum of raw tiers, used for the derived `Xp` / `GearXp` totals.
/// Always computed from scratch over the current inventory; quantities are
/// coerced the same way as any other number read from the save.
pub(crate) fn weighted_total(materials: &Materials, weights: &[(&str, i64)]) -> i64 {
    weights
        .iter()
        .map(|(id, weight)| materials.get(*id).map_or(0, coerce::int).saturating_mul(*weight))
        .fold(0i64, |acc, v| acc.saturating_add(v))
}
