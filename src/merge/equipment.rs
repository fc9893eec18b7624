//! Equipment materials: `(Category, Rarity, tier)` → planner material id, plus `GearXp`.
//!
//! Identifiers are not unique per input: two stacks that resolve to the same
//! id overwrite each other, and unrecognised categories all land on `""`.

use serde_json::Value;

use crate::save::SaveDocument;
use crate::snapshot::RawEquipment;

use super::weighted_total;

/// Gear slots tracked per tier as `T<tier>_<slot>`.
const GEAR_SLOTS: [&str; 9] = [
    "Hat", "Gloves", "Shoes", "Bag", "Badge", "Hairpin", "Charm", "Watch", "Necklace",
];

/// Weapon growth categories and the planner's archetype names.
const WEAPON_GROWTH: [(&str, &str); 4] = [
    ("WeaponExpGrowthA", "Spring"),
    ("WeaponExpGrowthB", "Hammer"),
    ("WeaponExpGrowthC", "Barrel"),
    ("WeaponExpGrowthZ", "Needle"),
];

/// Gear EXP granted per enhancement stone rank.
const GEAR_XP_WEIGHTS: [(&str, i64); 4] = [("GXP_1", 90), ("GXP_2", 360), ("GXP_3", 1440), ("GXP_4", 5760)];

pub const GEAR_XP_TOTAL_ID: &str = "GearXp";

/// N=1 … SSR=4. Unknown rarities rank as the empty string.
pub fn rarity_rank(rarity: &str) -> &'static str {
    match rarity {
        "N" => "1",
        "R" => "2",
        "SR" => "3",
        "SSR" => "4",
        _ => "",
    }
}

pub fn material_id(item: &RawEquipment) -> String {
    let category = item.category.as_str();
    if category == "Exp" {
        return format!("GXP_{}", rarity_rank(&item.rarity));
    }
    if GEAR_SLOTS.contains(&category) {
        return format!("T{}_{}", item.tier, category);
    }
    match WEAPON_GROWTH.iter().find(|(c, _)| *c == category) {
        Some((_, archetype)) => format!("T{}_{}", rarity_rank(&item.rarity), archetype),
        None => String::new(),
    }
}

/// Write every stack into the (already cleared) inventory and recompute `GearXp`.
/// Returns the number of raw entries written.
pub fn merge_equipment(doc: &mut SaveDocument, equipments: &[(String, RawEquipment)]) -> usize {
    for (_, item) in equipments {
        let id = material_id(item);
        if id.is_empty() {
            log::debug!("BA import: unmapped equipment category {:?}", item.category);
        }
        doc.owned_materials.insert(id, Value::from(item.num));
    }
    let gear_xp = weighted_total(&doc.owned_materials, &GEAR_XP_WEIGHTS);
    doc.owned_materials
        .insert(GEAR_XP_TOTAL_ID.to_string(), Value::from(gear_xp));
    equipments.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stack(category: &str, rarity: &str, tier: u32, num: i64) -> RawEquipment {
        RawEquipment {
            category: category.to_string(),
            rarity: rarity.to_string(),
            tier,
            num,
        }
    }

    fn keyed(items: Vec<RawEquipment>) -> Vec<(String, RawEquipment)> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, e)| (i.to_string(), e))
            .collect()
    }

    #[test]
    fn exp_stones_by_rarity() {
        assert_eq!(material_id(&stack("Exp", "N", 1, 0)), "GXP_1");
        assert_eq!(material_id(&stack("Exp", "R", 2, 0)), "GXP_2");
        assert_eq!(material_id(&stack("Exp", "SR", 3, 0)), "GXP_3");
        assert_eq!(material_id(&stack("Exp", "SSR", 4, 0)), "GXP_4");
        assert_eq!(material_id(&stack("Exp", "UR", 4, 0)), "GXP_");
    }

    #[test]
    fn gear_pieces_by_tier() {
        assert_eq!(material_id(&stack("Hat", "N", 3, 0)), "T3_Hat");
        assert_eq!(material_id(&stack("Necklace", "SR", 9, 0)), "T9_Necklace");
        assert_eq!(material_id(&stack("Hairpin", "", 0, 0)), "T0_Hairpin");
    }

    #[test]
    fn weapon_growth_by_rarity() {
        assert_eq!(material_id(&stack("WeaponExpGrowthA", "N", 1, 0)), "T1_Spring");
        assert_eq!(material_id(&stack("WeaponExpGrowthB", "R", 1, 0)), "T2_Hammer");
        assert_eq!(material_id(&stack("WeaponExpGrowthC", "SR", 1, 0)), "T3_Barrel");
        assert_eq!(material_id(&stack("WeaponExpGrowthZ", "SSR", 1, 0)), "T4_Needle");
        assert_eq!(material_id(&stack("WeaponExpGrowthA", "?", 1, 0)), "T_Spring");
    }

    #[test]
    fn unknown_category_maps_to_empty_id() {
        assert_eq!(material_id(&stack("Furniture", "N", 1, 0)), "");

        let mut doc = SaveDocument::default();
        merge_equipment(&mut doc, &keyed(vec![stack("Furniture", "N", 1, 7)]));
        assert_eq!(doc.material(""), 7);
    }

    #[test]
    fn sr_stones_scenario() {
        let mut doc = SaveDocument::default();
        merge_equipment(&mut doc, &keyed(vec![stack("Exp", "SR", 0, 3)]));

        assert_eq!(
            Value::Object(doc.owned_materials),
            json!({"GXP_3": 3, "GearXp": 4320})
        );
    }

    #[test]
    fn gear_xp_uses_all_ranks() {
        let mut doc = SaveDocument::default();
        merge_equipment(
            &mut doc,
            &keyed(vec![
                stack("Exp", "N", 1, 10),
                stack("Exp", "R", 2, 5),
                stack("Exp", "SR", 3, 2),
                stack("Exp", "SSR", 4, 1),
                stack("Gloves", "N", 2, 99),
            ]),
        );
        assert_eq!(doc.material("GearXp"), 10 * 90 + 5 * 360 + 2 * 1440 + 5760);
        assert_eq!(doc.material("T2_Gloves"), 99);
    }

    #[test]
    fn colliding_ids_keep_last_write() {
        let mut doc = SaveDocument::default();
        merge_equipment(
            &mut doc,
            &keyed(vec![stack("Hat", "N", 2, 4), stack("Hat", "R", 2, 11)]),
        );
        assert_eq!(doc.material("T2_Hat"), 11);
    }

    #[test]
    fn gear_xp_is_recomputed_not_accumulated() {
        let mut doc = SaveDocument::default();
        let raw = keyed(vec![stack("Exp", "N", 1, 4)]);
        merge_equipment(&mut doc, &raw);
        merge_equipment(&mut doc, &raw);
        assert_eq!(doc.material("GearXp"), 360);
    }
}
