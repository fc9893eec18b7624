//! Consumable items: exporter item codes → planner material ids, plus the `Xp` total.

use crate::coerce;
use crate::save::SaveDocument;
use serde_json::Value;

use super::weighted_total;

/// Activity report tiers. Any other code is already a planner id (e.g. `Credit`).
const ITEM_IDS: [(&str, &str); 4] = [("10", "XP_1"), ("11", "XP_2"), ("12", "XP_3"), ("13", "XP_4")];

/// Student EXP granted per report tier.
const XP_WEIGHTS: [(&str, i64); 4] = [("XP_1", 50), ("XP_2", 500), ("XP_3", 2000), ("XP_4", 10000)];

pub const XP_TOTAL_ID: &str = "Xp";

pub fn material_id(code: &str) -> &str {
    ITEM_IDS
        .iter()
        .find(|(from, _)| *from == code)
        .map_or(code, |(_, to)| *to)
}

/// Write every item into the (already cleared) inventory and recompute `Xp`.
/// Returns the number of raw entries written.
pub fn merge_items(doc: &mut SaveDocument, items: &[(String, Value)]) -> usize {
    for (code, quantity) in items {
        doc.owned_materials
            .insert(material_id(code).to_string(), Value::from(coerce::int(quantity)));
    }
    let xp = weighted_total(&doc.owned_materials, &XP_WEIGHTS);
    doc.owned_materials
        .insert(XP_TOTAL_ID.to_string(), Value::from(xp));
    items.len()
}
